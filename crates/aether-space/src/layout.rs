//! Closed-form addressing of the stored pyramid.
//!
//! Canonical cells satisfy `p[0] >= p[1] >= ... >= p[D-1] >= 0`. Grouped
//! into slices by `p[0]`, slice `x` holds `C(x + D - 1, D - 1)` cells and
//! the whole pyramid up to `x` is a prefix of the combinatorial number
//! system:
//!
//! ```text
//! address(p) = sum_i C(p[i] + D - 1 - i, D - i)
//! ```
//!
//! which is `x` in one dimension and `x(x + 1)/2 + y` in two. Within a
//! slice, addresses follow lexicographic order of the trailing
//! coordinates, so walking [`slice_cells`](PyramidLayout::slice_cells)
//! for `x = 0, 1, ...` visits every address exactly once in order.

use aether_core::Coord;
use smallvec::smallvec;

use crate::error::{check_dimension, SpaceError};

/// Address arithmetic for the canonical pyramid of a `D`-dimensional lattice.
///
/// # Examples
///
/// ```
/// use aether_space::PyramidLayout;
///
/// let layout = PyramidLayout::new(2).unwrap();
/// assert_eq!(layout.address(&[3, 1]), 7);
/// assert_eq!(layout.slice_len(3), 4);
/// assert_eq!(layout.total_cells(3), 10);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PyramidLayout {
    dimension: usize,
}

impl PyramidLayout {
    /// Create the layout for a `dimension`-dimensional lattice.
    pub fn new(dimension: usize) -> Result<Self, SpaceError> {
        check_dimension(dimension)?;
        Ok(Self { dimension })
    }

    /// Number of lattice axes.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Cells in slice `x` (all canonical cells with `p[0] == x`).
    pub fn slice_len(&self, x: i32) -> u64 {
        let d = self.dimension as u64;
        binomial(non_negative(x) + d - 1, d - 1)
    }

    /// Cells in slices `0..x`, which is also the address of the first cell of slice `x`.
    pub fn cells_before(&self, x: i32) -> u64 {
        let d = self.dimension as u64;
        binomial(non_negative(x) + d - 1, d)
    }

    /// Cells in a pyramid whose largest coordinate is `max_coordinate`.
    pub fn total_cells(&self, max_coordinate: i32) -> u64 {
        self.cells_before(max_coordinate + 1)
    }

    /// Address of a canonical cell.
    pub fn address(&self, canonical: &[i32]) -> u64 {
        self.cells_before(canonical[0]) + self.offset_in_slice(canonical)
    }

    /// Position of a canonical cell within its slice.
    pub fn offset_in_slice(&self, canonical: &[i32]) -> u64 {
        let d = self.dimension as u64;
        canonical
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, &p)| {
                let i = i as u64;
                binomial(non_negative(p) + d - 1 - i, d - i)
            })
            .sum()
    }

    /// Inverse of [`address`](Self::address).
    pub fn position_at(&self, address: u64) -> Coord {
        let d = self.dimension as u64;
        let mut position: Coord = smallvec![0; self.dimension];
        let mut remaining = address;
        let mut upper = i32::MAX;
        for i in 0..self.dimension {
            let k = d - i as u64;
            // Largest p with C(p + k - 1, k) <= remaining.
            let mut p = 0i32;
            while p < upper && binomial(p as u64 + k, k) <= remaining {
                p += 1;
            }
            remaining -= binomial(p as u64 + k - 1, k);
            position[i] = p;
            upper = p;
        }
        position
    }

    /// Iterate the cells of slice `x` in address order.
    pub fn slice_cells(&self, x: i32) -> SliceCells {
        let mut first: Coord = smallvec![0; self.dimension];
        first[0] = x;
        SliceCells {
            next: Some(first),
        }
    }
}

/// Iterator over the canonical cells of one slice, in address order.
///
/// Created by [`PyramidLayout::slice_cells`].
#[derive(Clone, Debug)]
pub struct SliceCells {
    next: Option<Coord>,
}

impl Iterator for SliceCells {
    type Item = Coord;

    fn next(&mut self) -> Option<Coord> {
        let current = self.next.take()?;
        // Lexicographic successor: bump the rightmost coordinate that is
        // still below its left neighbour and reset everything after it.
        if let Some(i) = (1..current.len()).rev().find(|&i| current[i] < current[i - 1]) {
            let mut successor = current.clone();
            successor[i] += 1;
            for v in &mut successor[i + 1..] {
                *v = 0;
            }
            self.next = Some(successor);
        }
        Some(current)
    }
}

fn non_negative(v: i32) -> u64 {
    debug_assert!(v >= 0, "negative coordinate {v} in canonical position");
    v.max(0) as u64
}

/// `C(n, k)`, zero when `k > n`.
pub fn binomial(n: u64, k: u64) -> u64 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut acc: u128 = 1;
    for i in 0..u128::from(k) {
        acc = acc * (u128::from(n) - i) / (i + 1);
    }
    acc as u64
}
