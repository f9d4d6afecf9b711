//! Hyperoctahedral symmetry folding.
//!
//! Every position `p` folds onto `canonical(p) = sort_descending(abs(p))`.
//! A canonical cell's `2D` axis neighbours fold onto at most `2D`
//! canonical neighbours; when several real neighbours land on the same
//! stored cell the fold has to weight them, both when the cell splits its
//! value (each real neighbour is one share) and when the share is
//! credited back (every mirrored copy of the cell gives to the stored
//! neighbour).

use aether_core::Coord;
use indexmap::{IndexMap, IndexSet};
use smallvec::SmallVec;

use crate::error::{check_dimension, SpaceError};

/// A canonical neighbour of a canonical cell, with folding weights.
///
/// Given a canonical cell `c` and a stored neighbour `n`:
///
/// - `symmetry_count` is how many of `c`'s real axis neighbours fold
///   onto `n`. It is the weight of `n` in `c`'s share divisor.
/// - `share_multiplier` is how many mirrored copies of `c` are adjacent
///   to one real copy of `n`, i.e. how many shares `n` receives when `c`
///   gives one share to each smaller neighbour. It always equals
///   `symmetry_count * orbit(c) / orbit(n)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FoldedNeighbour {
    /// Canonical position of the stored neighbour.
    pub position: Coord,
    /// Real neighbours of the cell that fold onto `position`.
    pub symmetry_count: u32,
    /// Shares credited to `position` per unit share given by the cell.
    pub share_multiplier: u32,
}

/// Symmetry folding for a `D`-dimensional hypercubic lattice.
///
/// # Examples
///
/// ```
/// use aether_space::HypercubicSymmetry;
///
/// let sym = HypercubicSymmetry::new(2).unwrap();
/// assert_eq!(sym.canonical(&[-1, 3]).as_slice(), &[3, 1]);
/// assert_eq!(sym.orbit_size(&[1, 0]), 4);
///
/// // (1, 0) has four real neighbours; (0, 1) and (0, -1) both fold onto (1, 1).
/// let folded = sym.folded_neighbours(&[1, 0]);
/// assert_eq!(folded.len(), 3);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HypercubicSymmetry {
    dimension: usize,
}

impl HypercubicSymmetry {
    /// Create the symmetry of a `dimension`-dimensional lattice.
    ///
    /// Returns `Err(SpaceError::DimensionOutOfRange)` for zero or more
    /// than [`MAX_DIMENSION`](aether_core::MAX_DIMENSION) dimensions.
    pub fn new(dimension: usize) -> Result<Self, SpaceError> {
        check_dimension(dimension)?;
        Ok(Self { dimension })
    }

    /// Number of lattice axes.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Fail unless `position` has exactly one coordinate per axis.
    pub fn check_position(&self, position: &[i32]) -> Result<(), SpaceError> {
        if position.len() != self.dimension {
            return Err(SpaceError::DimensionMismatch {
                expected: self.dimension,
                found: position.len(),
            });
        }
        Ok(())
    }

    /// The canonical representative of `position`.
    ///
    /// `i32::MIN` folds onto `i32::MAX`, its nearest representable
    /// mirror. Bounds grow by at most one per step, so both lie beyond
    /// any reachable grid and read as zero.
    pub fn canonical(&self, position: &[i32]) -> Coord {
        let mut folded: Coord = position.iter().map(|v| v.saturating_abs()).collect();
        folded.sort_unstable_by(|a, b| b.cmp(a));
        folded
    }

    /// Whether `position` is its own canonical representative.
    pub fn is_canonical(&self, position: &[i32]) -> bool {
        position.len() == self.dimension
            && position.last().is_some_and(|&v| v >= 0)
            && position.windows(2).all(|w| w[0] >= w[1])
    }

    /// Number of lattice positions that fold onto `canonical`.
    ///
    /// `2^(non-zero coordinates) * D! / prod(multiplicity!)`, where the
    /// product runs over runs of equal coordinates.
    pub fn orbit_size(&self, canonical: &[i32]) -> u64 {
        let nonzero = canonical.iter().filter(|&&v| v != 0).count();
        let mut size = factorial(canonical.len()) << nonzero;
        for run in canonical.chunk_by(|a, b| a == b) {
            size /= factorial(run.len());
        }
        size
    }

    /// The folded axis neighbourhood of `canonical`.
    ///
    /// Entries are distinct canonical positions in first-seen order
    /// (axis 0 down, axis 0 up, axis 1 down, ...). Their symmetry
    /// counts always sum to `2D`. A cell never folds onto itself.
    pub fn folded_neighbours(&self, canonical: &[i32]) -> SmallVec<[FoldedNeighbour; 8]> {
        let mut counts: IndexMap<Coord, u32> = IndexMap::with_capacity(2 * self.dimension);
        let mut probe: Coord = canonical.iter().copied().collect();
        for axis in 0..canonical.len() {
            for delta in [-1, 1] {
                probe[axis] = canonical[axis] + delta;
                *counts.entry(self.canonical(&probe)).or_insert(0) += 1;
            }
            probe[axis] = canonical[axis];
        }

        let orbit = self.orbit_size(canonical);
        counts
            .into_iter()
            .map(|(position, symmetry_count)| {
                let share_multiplier =
                    u64::from(symmetry_count) * orbit / self.orbit_size(&position);
                FoldedNeighbour {
                    position,
                    symmetry_count,
                    share_multiplier: share_multiplier as u32,
                }
            })
            .collect()
    }

    /// Every distinct lattice position equivalent to `position`.
    ///
    /// The result has exactly `orbit_size(canonical(position))` entries,
    /// which is `2^D * D!` in the worst case; intended for tests and
    /// brute-force cross-checks on small dimensions.
    pub fn orbit(&self, position: &[i32]) -> Vec<Coord> {
        let mut magnitudes: Coord = self.canonical(position);
        magnitudes.reverse();

        let mut images = IndexSet::new();
        loop {
            let nonzero: SmallVec<[usize; 4]> = magnitudes
                .iter()
                .enumerate()
                .filter(|(_, &v)| v != 0)
                .map(|(i, _)| i)
                .collect();
            for signs in 0u32..(1 << nonzero.len()) {
                let mut image = magnitudes.clone();
                for (bit, &axis) in nonzero.iter().enumerate() {
                    if signs & (1 << bit) != 0 {
                        image[axis] = -image[axis];
                    }
                }
                images.insert(image);
            }
            if !next_permutation(&mut magnitudes) {
                break;
            }
        }
        images.into_iter().collect()
    }
}

fn factorial(n: usize) -> u64 {
    (1..=n as u64).product()
}

/// Advance `values` to the next lexicographic permutation. Returns
/// `false` once the last permutation has been reached.
fn next_permutation(values: &mut [i32]) -> bool {
    let Some(pivot) = values.windows(2).rposition(|w| w[0] < w[1]) else {
        return false;
    };
    let successor = values
        .iter()
        .rposition(|&v| v > values[pivot])
        .unwrap_or(pivot + 1);
    values.swap(pivot, successor);
    values[pivot + 1..].reverse();
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invariants;
    use proptest::prelude::*;

    fn sym(d: usize) -> HypercubicSymmetry {
        HypercubicSymmetry::new(d).unwrap()
    }

    fn find<'a>(folded: &'a [FoldedNeighbour], position: &[i32]) -> &'a FoldedNeighbour {
        folded
            .iter()
            .find(|n| n.position.as_slice() == position)
            .unwrap_or_else(|| panic!("{position:?} missing from {folded:?}"))
    }

    #[test]
    fn rejects_bad_dimensions() {
        assert!(matches!(
            HypercubicSymmetry::new(0),
            Err(SpaceError::DimensionOutOfRange { dimension: 0, .. })
        ));
        assert!(HypercubicSymmetry::new(aether_core::MAX_DIMENSION + 1).is_err());
        assert!(HypercubicSymmetry::new(aether_core::MAX_DIMENSION).is_ok());
    }

    #[test]
    fn canonical_sorts_magnitudes_descending() {
        let s = sym(3);
        assert_eq!(s.canonical(&[-2, 5, 0]).as_slice(), &[5, 2, 0]);
        assert!(s.is_canonical(&[5, 2, 0]));
        assert!(!s.is_canonical(&[2, 5, 0]));
        assert!(!s.is_canonical(&[5, 2]));
    }

    #[test]
    fn most_negative_coordinate_folds_to_the_largest() {
        let s = sym(2);
        assert_eq!(s.canonical(&[3, i32::MIN]).as_slice(), &[i32::MAX, 3]);
        assert!(s.is_canonical(&s.canonical(&[i32::MIN, i32::MIN])));
    }

    #[test]
    fn orbit_sizes() {
        assert_eq!(sym(1).orbit_size(&[0]), 1);
        assert_eq!(sym(1).orbit_size(&[3]), 2);
        assert_eq!(sym(2).orbit_size(&[0, 0]), 1);
        assert_eq!(sym(2).orbit_size(&[1, 1]), 4);
        assert_eq!(sym(2).orbit_size(&[2, 1]), 8);
        assert_eq!(sym(3).orbit_size(&[1, 0, 0]), 6);
        assert_eq!(sym(3).orbit_size(&[2, 1, 0]), 24);
        assert_eq!(sym(3).orbit_size(&[1, 1, 1]), 8);
    }

    #[test]
    fn origin_in_one_dimension() {
        let folded = sym(1).folded_neighbours(&[0]);
        assert_eq!(folded.len(), 1);
        assert_eq!(folded[0].position.as_slice(), &[1]);
        assert_eq!(folded[0].symmetry_count, 2);
        assert_eq!(folded[0].share_multiplier, 1);
    }

    #[test]
    fn first_cell_in_one_dimension_gives_twice_to_origin() {
        let folded = sym(1).folded_neighbours(&[1]);
        let origin = find(&folded, &[0]);
        assert_eq!((origin.symmetry_count, origin.share_multiplier), (1, 2));
        let outer = find(&folded, &[2]);
        assert_eq!((outer.symmetry_count, outer.share_multiplier), (1, 1));
    }

    #[test]
    fn axis_cell_in_two_dimensions() {
        let folded = sym(2).folded_neighbours(&[1, 0]);
        assert_eq!(folded.len(), 3);
        let origin = find(&folded, &[0, 0]);
        assert_eq!((origin.symmetry_count, origin.share_multiplier), (1, 4));
        let outer = find(&folded, &[2, 0]);
        assert_eq!((outer.symmetry_count, outer.share_multiplier), (1, 1));
        let diagonal = find(&folded, &[1, 1]);
        assert_eq!((diagonal.symmetry_count, diagonal.share_multiplier), (2, 2));
    }

    #[test]
    fn diagonal_cell_in_two_dimensions() {
        let folded = sym(2).folded_neighbours(&[1, 1]);
        assert_eq!(folded.len(), 2);
        // (1, 0) touches both (1, 1) and (1, -1).
        let inner = find(&folded, &[1, 0]);
        assert_eq!((inner.symmetry_count, inner.share_multiplier), (2, 2));
        let outer = find(&folded, &[2, 1]);
        assert_eq!((outer.symmetry_count, outer.share_multiplier), (2, 1));
    }

    #[test]
    fn orbit_lists_every_image() {
        let s = sym(2);
        let images = s.orbit(&[1, 0]);
        assert_eq!(images.len(), 4);
        for image in [[1, 0], [-1, 0], [0, 1], [0, -1]] {
            assert!(images.iter().any(|p| p.as_slice() == image));
        }
        assert_eq!(s.orbit(&[0, 0]).len(), 1);
    }

    #[test]
    fn next_permutation_walks_multiset() {
        let mut v = [0, 1, 1];
        let mut seen = vec![v];
        while next_permutation(&mut v) {
            seen.push(v);
        }
        assert_eq!(seen, vec![[0, 1, 1], [1, 0, 1], [1, 1, 0]]);
    }

    fn arb_canonical(max_dim: usize) -> impl Strategy<Value = Coord> {
        (1..=max_dim).prop_flat_map(|d| prop::collection::vec(0i32..8, d)).prop_map(|mut v| {
            v.sort_unstable_by(|a, b| b.cmp(a));
            Coord::from_vec(v)
        })
    }

    proptest! {
        #[test]
        fn folding_is_balanced(c in arb_canonical(5)) {
            invariants::assert_fold_balanced(&sym(c.len()), &c);
        }

        #[test]
        fn orbit_matches_orbit_size(c in arb_canonical(4)) {
            invariants::assert_orbit_consistent(&sym(c.len()), &c);
        }

        #[test]
        fn canonical_is_idempotent(p in prop::collection::vec(-20i32..20, 1..6)) {
            let s = sym(p.len());
            let c = s.canonical(&p);
            prop_assert!(s.is_canonical(&c));
            prop_assert_eq!(s.canonical(&c), c);
        }
    }
}
