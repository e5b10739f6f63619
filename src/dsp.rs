//! Numerical core: segments, views, interpolation, and peak refinement.

pub mod interp;
pub mod norm;
pub mod peak;
pub mod segment;
pub mod view;

// Display geometry is built on power-of-two shifts so that zoom-level
// arithmetic stays exact. A zoom level is LOG_DISPLAY_NUM - log2(numbins).
pub const LOG_NUM_HARM_BINS: i32 = 7;
pub const LOG_DISPLAY_NUM: i32 = 10;
pub const LOG_LOCAL_CHUNK: i32 = 4;
pub const LOG_MIN_BINS: i32 = 5;
pub const LOG_MAX_BINS: i32 = 22;
pub const LOG_INITIAL_NUM_BINS: i32 = 16;

/// Bins shown for each harmonic of a candidate.
pub const NUM_HARM_BINS: usize = 1 << LOG_NUM_HARM_BINS;
/// Fixed width of every view's power array.
pub const DISPLAY_NUM: usize = 1 << LOG_DISPLAY_NUM;
/// Consecutive bins sharing one median-derived normalisation value.
pub const LOCAL_CHUNK: usize = 1 << LOG_LOCAL_CHUNK;
/// Fewest bins a view may span.
pub const MIN_BINS: usize = 1 << LOG_MIN_BINS;
/// Most bins a view (or segment) may span.
pub const MAX_BINS: usize = 1 << LOG_MAX_BINS;
/// Bins spanned by the initial view of a session.
pub const INITIAL_NUM_BINS: usize = 1 << LOG_INITIAL_NUM_BINS;

/// Most zoomed-out level (views spanning MAX_BINS bins).
pub const MIN_ZOOM: i32 = LOG_DISPLAY_NUM - LOG_MAX_BINS;
/// Most zoomed-in level (views spanning MIN_BINS bins).
pub const MAX_ZOOM: i32 = LOG_DISPLAY_NUM - LOG_MIN_BINS;
/// Zoom level of the first view built in a session.
pub const INITIAL_ZOOM: i32 = LOG_DISPLAY_NUM - LOG_INITIAL_NUM_BINS;

/// Ceiling a normalised power saturates to when its chunk statistics are
/// degenerate (zero median).
pub const POWER_CEILING: f32 = 1.0e30;
