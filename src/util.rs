//! Utility functions and types for fftexplore.

pub mod stats;
pub mod telemetry;

pub use stats::{mean_variance, median};
