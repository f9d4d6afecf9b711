//! Step loop for the Aether toppling automaton.
//!
//! Provides [`AetherEngine`], which advances a single-source
//! configuration on an unbounded lattice while storing only its
//! canonical section, plus compliance tracking and checkpointing.
//!
//! # Step outline
//!
//! ```text
//! for x in 0..=max + 1:            (max + 1 is an all-zero shell)
//!     for cell in slice x:
//!         topple(cell, strictly smaller folded neighbours)
//!         add kept value and shares into the staging grid
//!     release slice x - 1 of the published grid
//! publish, growing max by one if a cell at x >= max toppled
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod backup;
pub mod compliance;
pub mod config;
pub mod engine;
pub mod metrics;
pub mod topple;

pub use backup::CHECKPOINT_FILE_NAME;
pub use compliance::{ComplianceGrid, ComplianceRecorder, Turn};
pub use config::{ConfigError, EngineConfig, RestoreConfig};
pub use engine::{AetherEngine, EngineError};
pub use metrics::StepMetrics;
pub use topple::{topple, RelevantNeighbour, ToppleOutcome};
