//! Error types for lattice geometry.

use aether_core::Coord;
use std::fmt;

/// Errors arising from lattice construction or position queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpaceError {
    /// The lattice dimension is zero or above the supported maximum.
    DimensionOutOfRange {
        /// The requested dimension.
        dimension: usize,
        /// Largest supported dimension.
        max: usize,
    },
    /// A position has the wrong number of coordinates.
    DimensionMismatch {
        /// Coordinates the lattice expects.
        expected: usize,
        /// Coordinates the position has.
        found: usize,
    },
    /// A position passed to an asymmetric query is not canonical.
    NotCanonical {
        /// The offending position.
        position: Coord,
    },
}

impl fmt::Display for SpaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DimensionOutOfRange { dimension, max } => {
                write!(f, "dimension {dimension} outside supported range 1..={max}")
            }
            Self::DimensionMismatch { expected, found } => {
                write!(f, "position has {found} coordinates, lattice has {expected}")
            }
            Self::NotCanonical { position } => {
                write!(
                    f,
                    "position {position:?} is not canonical (expected non-negative, non-increasing coordinates)"
                )
            }
        }
    }
}

impl std::error::Error for SpaceError {}

/// Reject dimensions outside `1..=MAX_DIMENSION`.
pub(crate) fn check_dimension(dimension: usize) -> Result<(), SpaceError> {
    if dimension == 0 || dimension > aether_core::MAX_DIMENSION {
        return Err(SpaceError::DimensionOutOfRange {
            dimension,
            max: aether_core::MAX_DIMENSION,
        });
    }
    Ok(())
}
