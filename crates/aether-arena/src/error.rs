//! Arena-specific error types.

use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;

use aether_core::{Coord, ValueError};
use aether_space::SpaceError;

/// Errors that can occur during grid storage operations.
#[derive(Debug)]
pub enum ArenaError {
    /// An I/O error from the file-backed grid.
    Io(io::Error),
    /// The lattice geometry rejected the grid's dimension.
    Space(SpaceError),
    /// A value in a grid payload could not be decoded.
    Value(ValueError),
    /// A staging write landed outside the slices open for this step.
    OutOfBounds {
        /// The offending canonical position.
        position: Coord,
        /// Largest slice open for writing.
        max_slice: i32,
    },
    /// A published slice was read after being released.
    SliceReleased {
        /// The released slice.
        slice: i32,
    },
    /// `add`, `publish` or `abandon` without a preceding `begin_step`.
    NoStepInProgress,
    /// `begin_step` while a step is already staged.
    StepInProgress,
    /// Publishing without growth would drop non-zero cells beyond the bounds.
    MassBeyondBounds {
        /// The slice that still holds mass.
        slice: i32,
    },
    /// A grid payload does not match the grid it claims to describe.
    MalformedPayload {
        /// Human-readable description of what went wrong.
        detail: String,
    },
    /// The step file a checkpoint points at does not exist.
    MissingGridFile {
        /// Where the file was expected.
        path: PathBuf,
    },
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "grid I/O error: {e}"),
            Self::Space(e) => write!(f, "grid geometry: {e}"),
            Self::Value(e) => write!(f, "grid value: {e}"),
            Self::OutOfBounds {
                position,
                max_slice,
            } => {
                write!(f, "position {position:?} beyond staging slice {max_slice}")
            }
            Self::SliceReleased { slice } => {
                write!(f, "slice {slice} was released and can no longer be read")
            }
            Self::NoStepInProgress => write!(f, "no step in progress"),
            Self::StepInProgress => write!(f, "a step is already in progress"),
            Self::MassBeyondBounds { slice } => {
                write!(f, "slice {slice} holds mass but the grid did not grow")
            }
            Self::MalformedPayload { detail } => write!(f, "malformed grid payload: {detail}"),
            Self::MissingGridFile { path } => {
                write!(f, "missing grid file at \"{}\"", path.display())
            }
        }
    }
}

impl Error for ArenaError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Space(e) => Some(e),
            Self::Value(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ArenaError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<SpaceError> for ArenaError {
    fn from(e: SpaceError) -> Self {
        Self::Space(e)
    }
}

impl From<ValueError> for ArenaError {
    fn from(e: ValueError) -> Self {
        Self::Value(e)
    }
}
