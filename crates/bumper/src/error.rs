//! Simulator error types.

use thiserror::Error;

use crate::pool::MAX_WORKERS;

/// Hard cap on the total circle count, to keep store allocations sane.
pub const MAX_CIRCLES: u64 = 100_000_000;

/// Errors that can occur while building a simulation.
///
/// Everything here is fatal at construction time; nothing in the tick
/// hot path produces a recoverable error.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("total_circles must be at least 2, got {0}")]
    TooFewCircles(u64),

    #[error("total_circles {0} exceeds the supported maximum {}", MAX_CIRCLES)]
    TooManyCircles(u64),

    #[error("{axis} range is inverted: {min} > {max}")]
    InvertedRange {
        axis: &'static str,
        min: f32,
        max: f32,
    },

    #[error("circle radius must be strictly positive, got {0}")]
    NonPositiveRadius(f32),

    #[error("worker count must be in 1..={}, got {0}", MAX_WORKERS)]
    WorkerCountOutOfRange(u32),
}
