//! Aether: a deterministic toppling automaton on an unbounded lattice.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Aether sub-crates. For most users, adding `aether` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use aether::prelude::*;
//!
//! // 1000 at the origin of a 2D lattice, stored in memory.
//! let mut engine = AetherEngine::<i64>::new(EngineConfig::new(2, 1000), ()).unwrap();
//! for _ in 0..30 {
//!     engine.next_step().unwrap();
//! }
//!
//! // Only the canonical section is stored; every image reads the same.
//! assert_eq!(engine.get(&[3, -1]).unwrap(), engine.get(&[-1, -3]).unwrap());
//! assert_eq!(engine.total_mass().unwrap(), BigRational::from_integer(1000.into()));
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `aether-core` | The `Value` trait, coordinates, overflow limits |
//! | [`space`] | `aether-space` | Hypercubic symmetry folding and pyramid addressing |
//! | [`arena`] | `aether-arena` | In-memory and file-backed grid storage |
//! | [`checkpoint`] | `aether-checkpoint` | Checkpoint bundles and their binary codec |
//! | [`engine`] | `aether-engine` | The step loop, compliance tracking, backups |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Exact values, coordinates and overflow limits (`aether-core`).
///
/// [`types::Value`] is implemented for `i32`, `i64`, `BigInt` and
/// `BigRational`; the fixed-width ones also implement
/// [`types::FixedWidth`] for the file-backed grid.
pub use aether_core as types;

/// Symmetry folding and pyramid addressing (`aether-space`).
pub use aether_space as space;

/// Grid storage backends (`aether-arena`).
///
/// [`arena::MemoryArena`] is the default; [`arena::FileArena`] keeps one
/// file per step for grids that outgrow memory.
pub use aether_arena as arena;

/// Checkpoint bundles (`aether-checkpoint`).
pub use aether_checkpoint as checkpoint;

/// The step loop (`aether-engine`).
pub use aether_engine as engine;

/// Common imports for typical Aether usage.
///
/// ```rust
/// use aether::prelude::*;
/// ```
pub mod prelude {
    // Values
    pub use aether_core::{Coord, FixedWidth, Value, ValueKind};
    pub use num_bigint::BigInt;
    pub use num_rational::BigRational;

    // Storage
    pub use aether_arena::{FileArena, FileArenaOptions, GridArena, MemoryArena};

    // Engine
    pub use aether_engine::{
        AetherEngine, ConfigError, EngineConfig, EngineError, RestoreConfig, StepMetrics, Turn,
    };
}
