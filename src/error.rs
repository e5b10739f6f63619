use std::fmt;
use std::io;

/// Top-level error type for the fftexplore core API.
#[derive(Debug)]
pub enum ExploreError {
    /// The input file or its sidecar metadata is malformed.
    InputFormat(String),
    /// Underlying I/O failure while reading amplitudes.
    Io(io::Error),
    /// A requested window falls outside the loaded segment.
    OutOfRange(String),
    /// A normalisation statistic degenerated (zero median or zero mean).
    DegenerateStats(String),
    /// Peak refinement found no positive-power seed bin.
    NoRefinement,
}

impl fmt::Display for ExploreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExploreError::InputFormat(msg) => write!(f, "input format error: {}", msg),
            ExploreError::Io(e) => write!(f, "I/O error: {}", e),
            ExploreError::OutOfRange(msg) => write!(f, "out of range: {}", msg),
            ExploreError::DegenerateStats(msg) => write!(f, "degenerate statistics: {}", msg),
            ExploreError::NoRefinement => write!(f, "no positive-power bin near the selection"),
        }
    }
}

impl std::error::Error for ExploreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExploreError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ExploreError {
    fn from(e: io::Error) -> Self {
        ExploreError::Io(e)
    }
}

/// Convenience alias so callers can write `Result<T>` instead of `Result<T, ExploreError>`.
pub type Result<T> = std::result::Result<T, ExploreError>;
