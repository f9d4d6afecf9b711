//! Per-step metrics for the simulation engine.
//!
//! [`StepMetrics`] captures timing and work counts for a single step.

/// Timing and work counts collected during a single step.
///
/// The engine replaces these after each successful `next_step()` call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepMetrics {
    /// Wall-clock time for the entire step, in microseconds.
    pub total_us: u64,
    /// Canonical cells visited, including the zero shell beyond the bounds.
    pub cells_processed: u64,
    /// Cells that handed out at least one non-zero share.
    pub cells_toppled: u64,
    /// Slices of the previous grid released before publishing.
    pub slices_released: u32,
    /// Whether the bounds grew by one.
    pub grew: bool,
}
