//! The [`Coord`] type alias and lattice-wide constants.

use smallvec::SmallVec;

/// A position on the D-dimensional integer lattice.
///
/// Uses `SmallVec<[i32; 4]>` to avoid heap allocation for lattices
/// up to 4 dimensions. Higher-dimensional lattices spill to the heap
/// transparently.
pub type Coord = SmallVec<[i32; 4]>;

/// Largest supported lattice dimension.
///
/// Orbit sizes grow as `2^D * D!`; at 12 dimensions they still fit
/// comfortably in a `u64`.
pub const MAX_DIMENSION: usize = 12;

/// Build a [`Coord`] from the origin of a `dimension`-dimensional lattice.
pub fn origin(dimension: usize) -> Coord {
    SmallVec::from_elem(0, dimension)
}
