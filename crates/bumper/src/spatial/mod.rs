//! Spatial indexing utilities.
//!
//! The stationary population is kept sorted by x, which turns candidate
//! selection into a bounded binary locate plus an outward walk.

mod sweep;

pub use sweep::locate_in_window;
