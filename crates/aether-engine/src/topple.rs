//! The topple rule for a single cell.
//!
//! A cell shares its excess with every strictly smaller neighbour. The
//! neighbours are sorted ascending and grouped by equal value; groups
//! are visited from the largest down. At each group the cell and every
//! neighbour not yet caught up (this group and all smaller ones) split
//! the difference between what the cell still holds and the group's
//! value. Once a group is reached it stops taking shares.
//!
//! Equal neighbours always share one divisor, so ties receive identical
//! amounts regardless of input order.

use aether_core::Value;
use smallvec::SmallVec;

/// A neighbour whose value is strictly below the toppling cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelevantNeighbour<V> {
    /// The neighbour's current value.
    pub value: V,
    /// How many real lattice neighbours this stored neighbour stands for.
    /// Each one takes a share of the divisor.
    pub symmetry_count: u32,
    /// Copies of each share the stored neighbour actually receives.
    pub share_multiplier: u32,
}

/// What a cell keeps and gives away in one step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToppleOutcome<V> {
    /// Value the cell contributes to its own next state.
    pub kept: V,
    /// Amount added to each neighbour, aligned with the input slice.
    pub deltas: SmallVec<[V; 8]>,
    /// Whether any non-zero share was handed out.
    pub toppled: bool,
}

/// Apply the topple rule to a cell holding `value`.
///
/// Every entry of `neighbours` must hold a value strictly below `value`.
/// Each share is counted once per real neighbour, so
/// `kept + sum(share_i * symmetry_count_i) == value` holds exactly,
/// where `share_i = delta_i / share_multiplier_i`.
pub fn topple<V: Value>(value: &V, neighbours: &[RelevantNeighbour<V>]) -> ToppleOutcome<V> {
    let mut deltas: SmallVec<[V; 8]> = neighbours.iter().map(|_| V::zero()).collect();
    if neighbours.is_empty() {
        return ToppleOutcome {
            kept: value.clone(),
            deltas,
            toppled: false,
        };
    }

    let mut order: SmallVec<[usize; 8]> = (0..neighbours.len()).collect();
    order.sort_by(|&a, &b| neighbours[a].value.cmp(&neighbours[b].value));

    let mut active: u32 = 1 + neighbours.iter().map(|n| n.symmetry_count).sum::<u32>();
    let mut remaining = value.clone();
    let mut toppled = false;

    let mut end = order.len();
    while end > 0 {
        let group_value = &neighbours[order[end - 1]].value;
        let mut start = end - 1;
        while start > 0 && neighbours[order[start - 1]].value == *group_value {
            start -= 1;
        }

        let to_distribute = remaining.subtract(group_value);
        let (share, rest) = to_distribute.div_rem(active);
        if !share.is_zero() {
            toppled = true;
            for &i in &order[..end] {
                let gift = share.times(neighbours[i].share_multiplier);
                deltas[i] = deltas[i].add(&gift);
            }
        }
        remaining = group_value.add(&rest).add(&share);

        active -= order[start..end]
            .iter()
            .map(|&i| neighbours[i].symmetry_count)
            .sum::<u32>();
        end = start;
    }

    ToppleOutcome {
        kept: remaining,
        deltas,
        toppled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_rational::BigRational;
    use proptest::prelude::*;

    fn n(value: i64, symmetry_count: u32, share_multiplier: u32) -> RelevantNeighbour<i64> {
        RelevantNeighbour {
            value,
            symmetry_count,
            share_multiplier,
        }
    }

    /// Mass as seen by the unfolded lattice: each stored neighbour
    /// stands for `symmetry_count` real ones, each getting one share per
    /// copy of the cell that reaches it.
    fn unfolded_total(outcome: &ToppleOutcome<i64>, neighbours: &[RelevantNeighbour<i64>]) -> i64 {
        outcome.kept
            + neighbours
                .iter()
                .zip(&outcome.deltas)
                .map(|(nb, d)| d / i64::from(nb.share_multiplier) * i64::from(nb.symmetry_count))
                .sum::<i64>()
    }

    #[test]
    fn no_neighbours_keeps_everything() {
        let out = topple(&7i64, &[]);
        assert_eq!(out.kept, 7);
        assert!(out.deltas.is_empty());
        assert!(!out.toppled);
    }

    #[test]
    fn one_dimensional_origin_of_four() {
        let out = topple(&4i64, &[n(0, 2, 1)]);
        assert_eq!(out.kept, 2);
        assert_eq!(out.deltas.as_slice(), &[1]);
        assert!(out.toppled);
    }

    #[test]
    fn zero_cell_above_negative_source() {
        // 1D cell (1) next to the origin holding -4: the mirrored copy
        // at (-1) gives to the origin too, hence the multiplier of 2.
        let out = topple(&0i64, &[n(-4, 1, 2)]);
        assert_eq!(out.kept, -2);
        assert_eq!(out.deltas.as_slice(), &[4]);
    }

    #[test]
    fn small_excess_does_not_topple() {
        let out = topple(&2i64, &[n(0, 4, 1)]);
        assert_eq!(out.kept, 2);
        assert_eq!(out.deltas.as_slice(), &[0]);
        assert!(!out.toppled);
    }

    #[test]
    fn groups_are_visited_from_largest() {
        // 10 vs {6, 0}: first the 6-group takes (10-6)/3 = 1 each,
        // leaving 6 + 1 + 1 = 8; then (8-0)/2 = 4 for the 0-group.
        let out = topple(&10i64, &[n(0, 1, 1), n(6, 1, 1)]);
        assert_eq!(out.deltas.as_slice(), &[5, 1]);
        assert_eq!(out.kept, 4);
        assert_eq!(unfolded_total(&out, &[n(0, 1, 1), n(6, 1, 1)]), 10);
    }

    #[test]
    fn ties_share_one_divisor() {
        let neighbours = [n(1, 1, 1), n(3, 1, 1), n(1, 1, 1)];
        let out = topple(&20i64, &neighbours);
        assert_eq!(out.deltas[0], out.deltas[2]);
        assert_eq!(unfolded_total(&out, &neighbours), 20);
    }

    #[test]
    fn negative_division_truncates_toward_zero() {
        let out = topple(&-1i64, &[n(-9, 2, 1)]);
        // (-1 - -9) = 8, / 3 = 2 rem 2 -> kept -9 + 2 + 2
        assert_eq!(out.kept, -5);
        assert_eq!(out.deltas.as_slice(), &[2]);
    }

    #[test]
    fn rationals_split_exactly() {
        let cell = BigRational::from_integer(1.into());
        let nb = RelevantNeighbour {
            value: BigRational::from_integer(0.into()),
            symmetry_count: 2,
            share_multiplier: 1,
        };
        let out = topple(&cell, &[nb]);
        let third = BigRational::new(1.into(), 3.into());
        assert_eq!(out.kept, third);
        assert_eq!(out.deltas[0], third);
        assert!(out.toppled);
    }

    proptest! {
        #[test]
        fn mass_is_conserved(
            value in -1000i64..1000,
            raw in prop::collection::vec((-1000i64..1000, 1u32..4), 0..6),
        ) {
            let neighbours: Vec<_> = raw
                .into_iter()
                .filter(|(v, _)| *v < value)
                .map(|(v, s)| n(v, s, 1))
                .collect();
            let out = topple(&value, &neighbours);
            prop_assert_eq!(unfolded_total(&out, &neighbours), value);
        }

        #[test]
        fn equal_neighbours_receive_equal_deltas(
            value in -500i64..500,
            raw in prop::collection::vec(-3i64..3, 1..8),
        ) {
            let neighbours: Vec<_> = raw
                .into_iter()
                .map(|v| v * 100)
                .filter(|v| *v < value)
                .map(|v| n(v, 1, 1))
                .collect();
            let out = topple(&value, &neighbours);
            for (a, da) in neighbours.iter().zip(&out.deltas) {
                for (b, db) in neighbours.iter().zip(&out.deltas) {
                    if a.value == b.value {
                        prop_assert_eq!(da, db);
                    }
                }
            }
        }
    }
}
