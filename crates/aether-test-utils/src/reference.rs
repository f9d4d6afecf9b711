//! Brute-force reference simulation over the full lattice.
//!
//! Every position in the cube `[-r, r]^D` is stepped independently with
//! its raw axis neighbours. No folding, no multipliers: each real
//! neighbour is one share. Slow, but obviously correct, which makes it
//! the oracle for the folded engine.

use std::collections::HashMap;

use aether_core::coord::origin;
use aether_core::{Coord, Value};

/// The automaton on an explicit, unfolded lattice.
pub struct ReferenceSimulation<V: Value> {
    dimension: usize,
    radius: i32,
    step: u64,
    cells: HashMap<Coord, V>,
}

impl<V: Value> ReferenceSimulation<V> {
    /// A single `initial` value at the origin.
    pub fn new(dimension: usize, initial: V) -> Self {
        let mut cells = HashMap::new();
        cells.insert(origin(dimension), initial);
        Self {
            dimension,
            radius: 0,
            step: 0,
            cells,
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Largest `|p[i]|` that may hold a non-zero value.
    pub fn max_coordinate(&self) -> i32 {
        self.radius
    }

    pub fn step(&self) -> u64 {
        self.step
    }

    pub fn get(&self, position: &[i32]) -> V {
        self.cells.get(position).cloned().unwrap_or_else(V::zero)
    }

    /// Sum of every cell.
    pub fn total(&self) -> V {
        self.cells.values().fold(V::zero(), |acc, v| acc.add(v))
    }

    /// Every position in the cube `[-reach, reach]^D`.
    pub fn positions(&self, reach: i32) -> Vec<Coord> {
        let mut all = Vec::new();
        let mut p: Coord = std::iter::repeat(-reach).take(self.dimension).collect();
        loop {
            all.push(p.clone());
            let mut axis = 0;
            loop {
                if axis == self.dimension {
                    return all;
                }
                if p[axis] < reach {
                    p[axis] += 1;
                    break;
                }
                p[axis] = -reach;
                axis += 1;
            }
        }
    }

    /// Advance one step; returns whether any cell gave away a share.
    pub fn next_step(&mut self) -> bool {
        let mut next: HashMap<Coord, V> = HashMap::new();
        let mut toppled_any = false;
        let mut grow = false;

        for p in self.positions(self.radius + 1) {
            let value = self.get(&p);
            let mut smaller: Vec<(Coord, V)> = Vec::new();
            for axis in 0..self.dimension {
                for delta in [-1, 1] {
                    let mut q = p.clone();
                    q[axis] += delta;
                    let v = self.get(&q);
                    if v < value {
                        smaller.push((q, v));
                    }
                }
            }
            smaller.sort_by(|a, b| a.1.cmp(&b.1));

            let mut remaining = value;
            let mut active = smaller.len() as u32 + 1;
            let mut end = smaller.len();
            while end > 0 {
                let group_value = smaller[end - 1].1.clone();
                let mut start = end - 1;
                while start > 0 && smaller[start - 1].1 == group_value {
                    start -= 1;
                }
                let to_distribute = remaining.subtract(&group_value);
                let (share, rem) = to_distribute.div_rem(active);
                if !share.is_zero() {
                    toppled_any = true;
                    if p.iter().map(|c| c.abs()).max().unwrap_or(0) >= self.radius {
                        grow = true;
                    }
                    for (q, _) in &smaller[..end] {
                        credit(&mut next, q, &share);
                    }
                    remaining = group_value.add(&rem).add(&share);
                }
                active -= (end - start) as u32;
                end = start;
            }
            credit(&mut next, &p, &remaining);
        }

        next.retain(|_, v| !v.is_zero());
        self.cells = next;
        if grow {
            self.radius += 1;
        }
        self.step += 1;
        toppled_any
    }
}

fn credit<V: Value>(grid: &mut HashMap<Coord, V>, position: &Coord, amount: &V) {
    if amount.is_zero() {
        return;
    }
    let slot = grid.entry(position.clone()).or_insert_with(V::zero);
    *slot = slot.add(amount);
}
