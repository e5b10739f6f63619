//! A loaded, immutable slice of the spectrum with per-chunk noise statistics.

use num_complex::Complex32;
use tracing::debug;

use crate::dsp::LOCAL_CHUNK;
use crate::error::{ExploreError, Result};
use crate::input::AmplitudeSource;
use crate::util::stats::median;

/// A contiguous range of complex amplitudes covering bins
/// [rlo, rlo + num_amps), with raw powers and one median-derived
/// normalisation factor per LOCAL_CHUNK bins. Immutable after construction.
#[derive(Debug, Clone)]
pub struct Segment {
    rlo: u64,
    amps: Vec<Complex32>,
    raw_powers: Vec<f32>,
    medians: Vec<f32>,
    norm_vals: Vec<f32>,
    max_raw_power: f32,
    dc_amplitude: Option<f32>,
}

impl Segment {
    /// Load bins [rlo, rlo + numr) from `source`. `numr` must be a positive
    /// multiple of LOCAL_CHUNK.
    pub fn read<S: AmplitudeSource>(source: &mut S, rlo: u64, numr: usize) -> Result<Self> {
        let amps = source.read_range(rlo, numr)?;
        Self::from_amps(rlo, amps)
    }

    /// Build a segment directly from amplitudes whose first element is bin `rlo`.
    pub fn from_amps(rlo: u64, mut amps: Vec<Complex32>) -> Result<Self> {
        if amps.is_empty() || amps.len() % LOCAL_CHUNK != 0 {
            return Err(ExploreError::InputFormat(format!(
                "segment length {} is not a positive multiple of {}",
                amps.len(),
                LOCAL_CHUNK
            )));
        }

        // The DC bin would dominate the first chunk's statistics, so it is
        // remembered separately and replaced by a unit amplitude.
        let dc_amplitude = if rlo == 0 {
            let dc = amps[0].re;
            amps[0] = Complex32::new(1.0, 0.0);
            Some(dc)
        } else {
            None
        };

        let raw_powers: Vec<f32> = amps.iter().map(|a| a.norm_sqr()).collect();
        let max_raw_power = raw_powers.iter().copied().fold(0.0, f32::max);

        let num_chunks = raw_powers.len() / LOCAL_CHUNK;
        let mut medians = Vec::with_capacity(num_chunks);
        let mut norm_vals = Vec::with_capacity(num_chunks);
        let mut chunk = [0.0f32; LOCAL_CHUNK];
        for c in 0..num_chunks {
            chunk.copy_from_slice(&raw_powers[c * LOCAL_CHUNK..(c + 1) * LOCAL_CHUNK]);
            let med = median(&mut chunk);
            medians.push(med);
            if med > 0.0 {
                norm_vals.push(1.0 / (std::f32::consts::LN_2 * med));
            } else {
                // Degenerate chunk: powers normalised by it clip at the ceiling.
                norm_vals.push(f32::INFINITY);
            }
        }

        debug!(
            "[segment] loaded bins [{}, {}), {} chunks, max raw power {:.6e}",
            rlo,
            rlo + raw_powers.len() as u64,
            num_chunks,
            max_raw_power
        );

        Ok(Self {
            rlo,
            amps,
            raw_powers,
            medians,
            norm_vals,
            max_raw_power,
            dc_amplitude,
        })
    }

    /// Lowest absolute bin number covered.
    pub fn rlo(&self) -> u64 {
        self.rlo
    }

    /// Number of amplitudes held.
    pub fn num_amps(&self) -> usize {
        self.amps.len()
    }

    /// One past the highest absolute bin number covered.
    pub fn rhi(&self) -> u64 {
        self.rlo + self.amps.len() as u64
    }

    pub fn amps(&self) -> &[Complex32] {
        &self.amps
    }

    pub fn raw_powers(&self) -> &[f32] {
        &self.raw_powers
    }

    pub fn medians(&self) -> &[f32] {
        &self.medians
    }

    pub fn max_raw_power(&self) -> f32 {
        self.max_raw_power
    }

    /// Real part of the original DC bin, when this segment starts at bin 0.
    pub fn dc_amplitude(&self) -> Option<f32> {
        self.dc_amplitude
    }

    /// Median-derived normalisation factor for the chunk nearest to absolute
    /// bin position `r` (piecewise constant, rounded to the nearest chunk).
    pub fn norm_val_at(&self, r: f64) -> f32 {
        let index = ((r - self.rlo as f64) / LOCAL_CHUNK as f64 + 0.5).floor() as usize;
        self.norm_vals[index.min(self.norm_vals.len() - 1)]
    }
}
