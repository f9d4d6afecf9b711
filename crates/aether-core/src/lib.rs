//! Core value types and coordinates for the Aether toppling automaton.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the abstractions every other Aether crate builds on: lattice
//! coordinates, the exact numeric [`Value`] contract the topple rule
//! runs on, and the overflow bounds for fixed-width values.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod coord;
pub mod error;
pub mod limits;
pub mod value;

pub use coord::{Coord, MAX_DIMENSION};
pub use error::ValueError;
pub use limits::{max_neighbour_difference, min_single_source};
pub use value::{FixedWidth, Value, ValueKind};
