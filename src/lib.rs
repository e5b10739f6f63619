//! Core machinery for interactively exploring a precomputed search-mode FFT.
//!
//! The crate turns a window of raw complex FFT amplitudes into a displayable
//! view at an arbitrary zoom level, and refines selected candidates to
//! fractional-bin precision. Plotting and input devices are left to the host.

pub mod dsp;
pub mod error;
pub mod explorer;
pub mod input;
pub mod session;
pub mod util;

pub use dsp::norm::NormalizationMode;
pub use dsp::peak::Candidate;
pub use dsp::segment::Segment;
pub use dsp::view::FftView;
pub use error::{ExploreError, Result};
pub use explorer::Explorer;
pub use session::SessionParams;
