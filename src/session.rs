//! Session-wide scalars describing the time series behind the FFT.

use crate::input::metadata::InfMetadata;

/// Immutable parameters of the exploration session, fixed before the first
/// view is built. Bin r corresponds to frequency r / duration() Hz.
#[derive(Debug, Clone)]
pub struct SessionParams {
    /// Number of points in the original time series.
    pub n: u64,
    /// Sample interval of the time series in seconds.
    pub dt: f64,
    /// Number of complex bins in the FFT file.
    pub nfft: u64,
    /// Name of the observed object, when the sidecar metadata supplies one.
    pub object: Option<String>,
}

impl SessionParams {
    pub fn new(metadata: InfMetadata, nfft: u64) -> Self {
        Self {
            n: metadata.n,
            dt: metadata.dt,
            nfft,
            object: metadata.object,
        }
    }

    /// Total duration T of the time series in seconds.
    pub fn duration(&self) -> f64 {
        self.n as f64 * self.dt
    }

    /// Convert a frequency in Hz to a fractional bin number.
    pub fn freq_to_bin(&self, freq_hz: f64) -> f64 {
        freq_hz * self.duration()
    }

    /// Convert a fractional bin number to a frequency in Hz.
    pub fn bin_to_freq(&self, r: f64) -> f64 {
        r / self.duration()
    }
}
