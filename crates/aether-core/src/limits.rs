//! Overflow bounds for fixed-width values.
//!
//! A single negative source makes its neighbours climb above it while it
//! keeps sinking, so the largest difference between two neighbouring
//! cells over a whole run can exceed the magnitude of the source. A
//! bounded value type is only safe when that difference still fits.

/// Largest difference between two neighbouring cells that a single
/// source of `source` can produce over an entire run.
pub fn max_neighbour_difference(dimension: usize, source: i128) -> i128 {
    if source >= 0 {
        return source;
    }
    if dimension == 1 {
        return -source;
    }
    let neighbourhood = 2 * dimension as i128 + 1;
    (source + (-source / 2) * neighbourhood).abs()
}

/// Smallest single-source value whose run never produces a neighbour
/// difference above `max_allowed`.
///
/// Returns `0` when `max_allowed` is zero. Any source at or above the
/// returned value is safe for a type whose largest value is `max_allowed`.
pub fn min_single_source(dimension: usize, max_allowed: i128) -> i128 {
    if max_allowed == 0 {
        return 0;
    }
    if dimension == 1 {
        return -max_allowed;
    }
    let spread = 2 * dimension as i128 - 1;
    if max_allowed < spread {
        return -1;
    }
    let candidate = 2 * max_allowed / -spread;
    let below = candidate - 1;
    if max_neighbour_difference(dimension, below) > max_allowed {
        candidate
    } else {
        below
    }
}
