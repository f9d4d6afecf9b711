//! Engine configuration, validation, and error types.
//!
//! [`EngineConfig`] describes a fresh simulation; [`RestoreConfig`]
//! describes what a restoring engine expects to find in a checkpoint.
//! Storage-specific settings travel separately as the arena's
//! [`Options`](aether_arena::GridArena::Options).

use std::error::Error;
use std::fmt;

use aether_core::{Value, MAX_DIMENSION};

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`EngineConfig::validate()`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Dimension is zero or above [`MAX_DIMENSION`].
    DimensionOutOfRange {
        /// The configured dimension.
        dimension: usize,
        /// Largest supported dimension.
        max: usize,
    },
    /// The initial value is so negative that neighbour differences
    /// could overflow the value type during the run.
    InitialValueTooLow {
        /// The configured initial value.
        value: String,
        /// Smallest safe initial value for this dimension and type.
        minimum: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DimensionOutOfRange { dimension, max } => {
                write!(f, "dimension {dimension} is outside 1..={max}")
            }
            Self::InitialValueTooLow { value, minimum } => {
                write!(
                    f,
                    "initial value {value} is below the safe minimum {minimum}"
                )
            }
        }
    }
}

impl Error for ConfigError {}

// ── EngineConfig ───────────────────────────────────────────────────

/// Everything needed to start a simulation at step 0.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig<V: Value> {
    /// Number of lattice axes.
    pub dimension: usize,
    /// Value placed at the origin; every other cell starts at zero.
    pub initial_value: V,
    /// Record the toppling-alternation compliance grid each step.
    pub track_compliance: bool,
}

impl<V: Value> EngineConfig<V> {
    /// A configuration with compliance tracking disabled.
    pub fn new(dimension: usize, initial_value: V) -> Self {
        Self {
            dimension,
            initial_value,
            track_compliance: false,
        }
    }

    /// Enable or disable compliance tracking.
    pub fn with_compliance(mut self, track: bool) -> Self {
        self.track_compliance = track;
        self
    }

    /// Check the dimension and the initial value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_dimension(self.dimension)?;
        if let Some(minimum) = V::min_single_source(self.dimension) {
            if self.initial_value < minimum {
                return Err(ConfigError::InitialValueTooLow {
                    value: self.initial_value.to_string(),
                    minimum: minimum.to_string(),
                });
            }
        }
        Ok(())
    }
}

// ── RestoreConfig ──────────────────────────────────────────────────

/// What a restoring engine requires of a checkpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RestoreConfig {
    /// Dimension the checkpoint must have been written with.
    pub dimension: usize,
    /// Whether the restored engine tracks compliance.
    pub track_compliance: bool,
}

impl RestoreConfig {
    /// Expect a `dimension`-dimensional checkpoint, compliance tracking off.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            track_compliance: false,
        }
    }

    /// Enable or disable compliance tracking.
    pub fn with_compliance(mut self, track: bool) -> Self {
        self.track_compliance = track;
        self
    }

    /// Check the dimension.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_dimension(self.dimension)
    }
}

fn check_dimension(dimension: usize) -> Result<(), ConfigError> {
    if dimension == 0 || dimension > MAX_DIMENSION {
        return Err(ConfigError::DimensionOutOfRange {
            dimension,
            max: MAX_DIMENSION,
        });
    }
    Ok(())
}
