//! Lattice geometry for the Aether automaton.
//!
//! A single source at the origin keeps every configuration invariant
//! under the hyperoctahedral group (sign flips on every axis plus axis
//! permutations). This crate provides the two pieces of geometry that
//! let the engine store only one representative per orbit:
//!
//! - [`HypercubicSymmetry`]: canonical positions, orbit sizes, and the
//!   folded neighbourhood of a canonical cell with the weights the
//!   topple rule needs.
//! - [`PyramidLayout`]: the closed-form address of every canonical cell
//!   inside the stored pyramid `max >= p[0] >= p[1] >= ... >= p[D-1] >= 0`,
//!   laid out slice by slice along `p[0]`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod layout;
pub mod symmetry;

#[cfg(test)]
pub(crate) mod invariants;

pub use error::SpaceError;
pub use layout::{PyramidLayout, SliceCells};
pub use symmetry::{FoldedNeighbour, HypercubicSymmetry};
