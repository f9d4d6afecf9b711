//! The backend-agnostic grid contract.

use std::path::Path;

use aether_core::Value;
use aether_space::PyramidLayout;

use crate::error::ArenaError;

/// Where a backend keeps its grids.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageKind {
    /// Slices held in memory.
    Memory,
    /// Fixed-width records in one file per step.
    File,
}

/// Shape of a stored grid, as recorded in a checkpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridHeader {
    /// Lattice dimension.
    pub dimension: usize,
    /// Largest stored coordinate.
    pub max_coordinate: i32,
    /// Step the grid belongs to.
    pub step: u64,
}

/// Double-buffered storage for the canonical pyramid.
///
/// The published grid covers slices `0..=max_coordinate`; every cell
/// outside it reads as zero. A step stages a new grid covering
/// `0..=max_coordinate + 1`, which `publish` trims back to
/// `max_coordinate` or `max_coordinate + 1` slices depending on whether
/// the grid grew.
///
/// Positions passed to `read` and `add` must be canonical.
pub trait GridArena<V: Value>: Sized {
    /// Backend-specific construction options.
    type Options;

    /// Where this backend keeps its grids.
    const STORAGE: StorageKind;

    /// Build the step-0 grid: `initial` at the origin, zero elsewhere.
    fn create(dimension: usize, initial: &V, options: Self::Options) -> Result<Self, ArenaError>;

    /// Rebuild a grid from the payload [`export`](Self::export) produced.
    ///
    /// `directory` is the checkpoint directory the payload was read from.
    fn import(
        header: GridHeader,
        payload: &[u8],
        directory: &Path,
        options: Self::Options,
    ) -> Result<Self, ArenaError>;

    /// Address arithmetic for this grid's dimension.
    fn layout(&self) -> &PyramidLayout;

    /// Largest coordinate of the published grid.
    fn max_coordinate(&self) -> i32;

    /// Step the published grid belongs to.
    fn step(&self) -> u64;

    /// Value of a canonical cell in the published grid.
    fn read(&self, canonical: &[i32]) -> Result<V, ArenaError>;

    /// Open a staging grid for step `next_step`.
    fn begin_step(&mut self, next_step: u64) -> Result<(), ArenaError>;

    /// Accumulate `delta` into a canonical cell of the staging grid.
    fn add(&mut self, canonical: &[i32], delta: &V) -> Result<(), ArenaError>;

    /// Declare slice `x` of the published grid consumed.
    ///
    /// The memory backend frees the slice at once, so it stays
    /// unreadable even if the step is later abandoned.
    fn release_slice(&mut self, x: i32) -> Result<(), ArenaError>;

    /// Replace the published grid with the staging grid.
    fn publish(&mut self, grew: bool) -> Result<(), ArenaError>;

    /// Discard the staging grid after a failed step.
    fn abandon(&mut self);

    /// Serialize the published grid for a checkpoint written to `directory`.
    fn export(&self, directory: &Path) -> Result<Vec<u8>, ArenaError>;

    /// Release every resource the arena holds.
    fn close(self) -> Result<(), ArenaError>;
}
