//! Test utilities for Aether development.
//!
//! Provides a brute-force [`ReferenceSimulation`] that steps the full,
//! unfolded lattice with no symmetry tricks, and a [`ScratchDir`]
//! fixture for tests that touch the filesystem.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;
pub mod reference;

pub use fixtures::ScratchDir;
pub use reference::ReferenceSimulation;
