//! Building a fixed-width display view from a segment at a given zoom.

use tracing::debug;

use crate::dsp::interp::interpolate_span;
use crate::dsp::segment::Segment;
use crate::dsp::{DISPLAY_NUM, MAX_ZOOM, MIN_ZOOM, POWER_CEILING};
use crate::error::{ExploreError, Result};

/// A window of exactly DISPLAY_NUM normalised power samples.
///
/// Positive zoom levels interpolate 2^zoom samples per bin; zoom 0 shows one
/// raw power per sample; negative levels max-pool 2^|zoom| raw powers per
/// sample. DISPLAY_NUM * dr always equals num_bins exactly.
#[derive(Debug, Clone)]
pub struct FftView {
    /// Signed zoom level this view was built at.
    pub zoom_level: i32,
    /// The requested center, as a fractional bin number.
    pub center_r: f64,
    /// Lowest bin displayed.
    pub lor: u64,
    /// Bin step between consecutive display samples.
    pub dr: f64,
    /// Total bins spanned by the view.
    pub num_bins: usize,
    /// Fractional bin number of each display sample.
    pub rs: Vec<f64>,
    /// Normalised power of each display sample.
    pub powers: Vec<f32>,
    /// Largest power in the view.
    pub max_power: f32,
}

impl FftView {
    /// Bin position and power of the strongest display sample.
    pub fn peak(&self) -> (f64, f32) {
        let mut best = 0;
        for (i, &p) in self.powers.iter().enumerate() {
            if p > self.powers[best] {
                best = i;
            }
        }
        (self.rs[best], self.powers[best])
    }
}

fn saturate(power: f64) -> f32 {
    if power.is_finite() {
        power as f32
    } else {
        POWER_CEILING
    }
}

/// Build the view centered (as near as clamping allows) on `center_r` at
/// `zoom_level`. A `norm_const` of zero selects the segment's per-chunk
/// median normalisation; any other value is applied globally.
pub fn build_view(
    segment: &Segment,
    center_r: f64,
    zoom_level: i32,
    norm_const: f32,
) -> Result<FftView> {
    if !(MIN_ZOOM..=MAX_ZOOM).contains(&zoom_level) {
        return Err(ExploreError::OutOfRange(format!(
            "zoom level {} outside [{}, {}]",
            zoom_level, MIN_ZOOM, MAX_ZOOM
        )));
    }

    let (num_bins, dr) = if zoom_level > 0 {
        let samples_per_bin = 1usize << zoom_level;
        (DISPLAY_NUM / samples_per_bin, 1.0 / samples_per_bin as f64)
    } else {
        let bins_per_sample = 1usize << (-zoom_level);
        (DISPLAY_NUM * bins_per_sample, bins_per_sample as f64)
    };

    if num_bins > segment.num_amps() {
        return Err(ExploreError::OutOfRange(format!(
            "view spans {} bins but the segment holds {}",
            num_bins,
            segment.num_amps()
        )));
    }

    // Clamp the low edge into the segment; refuse windows past the top so the
    // caller can rebuild a larger segment or drop the pan.
    let lor = ((center_r - 0.5 * num_bins as f64).floor() as i64).max(segment.rlo() as i64) as u64;
    if lor + num_bins as u64 > segment.rhi() {
        return Err(ExploreError::OutOfRange(format!(
            "view [{}, {}) extends past segment top {}",
            lor,
            lor + num_bins as u64,
            segment.rhi()
        )));
    }

    let norm_factor = |r: f64| -> f64 {
        if norm_const == 0.0 {
            segment.norm_val_at(r) as f64
        } else {
            norm_const as f64
        }
    };

    let mut rs = Vec::with_capacity(DISPLAY_NUM);
    let mut powers = Vec::with_capacity(DISPLAY_NUM);

    if zoom_level > 0 {
        let start = (lor - segment.rlo()) as f64;
        let interp = interpolate_span(segment.amps(), start, dr, DISPLAY_NUM);
        for (i, value) in interp.iter().enumerate() {
            let r = lor as f64 + i as f64 * dr;
            rs.push(r);
            powers.push(saturate(value.norm_sqr() * norm_factor(r)));
        }
    } else {
        let bins_per_sample = dr as usize;
        let offset = (lor - segment.rlo()) as usize;
        let raw = &segment.raw_powers()[offset..offset + num_bins];
        let normalised: Vec<f32> = raw
            .iter()
            .enumerate()
            .map(|(j, &p)| saturate(p as f64 * norm_factor((lor + j as u64) as f64)))
            .collect();

        for i in 0..DISPLAY_NUM {
            let pooled = normalised[i * bins_per_sample..(i + 1) * bins_per_sample]
                .iter()
                .copied()
                .fold(0.0f32, f32::max);
            rs.push((lor + (i * bins_per_sample) as u64) as f64);
            powers.push(pooled);
        }
    }

    let max_power = powers.iter().copied().fold(0.0f32, f32::max);

    debug!(
        "[view] zoom {} center {:.3} -> lor {} num_bins {} max power {:.4e}",
        zoom_level, center_r, lor, num_bins, max_power
    );

    Ok(FftView {
        zoom_level,
        center_r,
        lor,
        dr,
        num_bins,
        rs,
        powers,
        max_power,
    })
}
