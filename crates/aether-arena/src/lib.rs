//! Grid storage for the Aether automaton.
//!
//! Both backends store the canonical pyramid of the lattice and follow
//! the same double-buffered lifecycle: a published grid that is only
//! read, and a staging grid that only accumulates additions.
//!
//! # Architecture
//!
//! ```text
//! GridArena<V> (trait, one per backend)
//! ├── MemoryArena<V>: Vec<Option<Vec<V>>> slices, released as consumed
//! └── FileArena<V: FixedWidth>: one `step=N.data` file per step
//!     └── working dir `grid-<pid>-<n>/`, removed on close
//! ```
//!
//! # Step lifecycle
//!
//! 1. `begin_step(n)`: open a staging grid one slice deeper than the
//!    published one
//! 2. `read()` from the published grid, `add()` into the staging grid
//! 3. `release_slice(x)` once slice `x` of the published grid is no
//!    longer needed
//! 4. `publish(grew)` swaps staging in, or `abandon()` discards it

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod file;
pub mod grid;
pub mod memory;

pub use error::ArenaError;
pub use file::{FileArena, FileArenaOptions, GRID_FOLDER_NAME};
pub use grid::{GridArena, GridHeader, StorageKind};
pub use memory::MemoryArena;
