//! Power normalisation policies.
//!
//! Each policy resolves to a single scalar shared by subsequent view builds.
//! Zero is the sentinel selecting the segment's per-chunk median values; any
//! other constant is applied globally.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::dsp::segment::Segment;
use crate::error::{ExploreError, Result};
use crate::util::stats::mean_variance;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum NormalizationMode {
    /// Median values determined locally, chunk by chunk.
    Median,
    /// The DC frequency amplitude.
    Dc,
    /// Raw powers, no normalisation.
    Raw,
    /// Mean raw power over a user-selected closed bin interval.
    AvgInterval { lo_bin: u64, hi_bin: u64 },
}

/// Resolve a policy to the norm_const scalar used by view builds.
///
/// `dc_amplitude` is the DC amplitude captured when the bin-0 segment was
/// constructed.
pub fn resolve_norm_const(
    mode: NormalizationMode,
    segment: &Segment,
    dc_amplitude: f32,
) -> Result<f32> {
    match mode {
        NormalizationMode::Median => {
            info!("[norm] using local median normalisation");
            Ok(0.0)
        }
        NormalizationMode::Dc => {
            if dc_amplitude == 0.0 {
                return Err(ExploreError::DegenerateStats(
                    "DC amplitude is zero".into(),
                ));
            }
            info!("[norm] using DC amplitude ({dc_amplitude}) normalisation");
            Ok(1.0 / dc_amplitude)
        }
        NormalizationMode::Raw => {
            info!("[norm] using raw powers");
            Ok(1.0)
        }
        NormalizationMode::AvgInterval { lo_bin, hi_bin } => {
            let (lo, hi) = if lo_bin <= hi_bin {
                (lo_bin, hi_bin)
            } else {
                (hi_bin, lo_bin)
            };
            if lo < segment.rlo() || hi >= segment.rhi() {
                return Err(ExploreError::OutOfRange(format!(
                    "interval [{lo}, {hi}] outside segment [{}, {})",
                    segment.rlo(),
                    segment.rhi()
                )));
            }

            let offset = (lo - segment.rlo()) as usize;
            let count = (hi - lo + 1) as usize;
            let (avg, var) = mean_variance(&segment.raw_powers()[offset..offset + count]);
            if avg <= 0.0 {
                return Err(ExploreError::DegenerateStats(format!(
                    "selected interval [{lo}, {hi}] has zero mean power"
                )));
            }

            info!(
                "[norm] interval [{lo}, {hi}]: average = {avg:.5e}, std dev = {:.5e}",
                var.sqrt()
            );
            Ok((1.0 / avg) as f32)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex32;

    fn segment() -> Segment {
        let mut amps = vec![Complex32::new(2.0, 0.0); 32];
        amps[0] = Complex32::new(500.0, 0.0);
        Segment::from_amps(0, amps).expect("segment")
    }

    #[test]
    fn median_mode_resolves_to_the_sentinel() {
        let seg = segment();
        assert_eq!(
            resolve_norm_const(NormalizationMode::Median, &seg, 500.0).unwrap(),
            0.0
        );
    }

    #[test]
    fn dc_mode_inverts_the_captured_dc_amplitude() {
        let seg = segment();
        let nc = resolve_norm_const(NormalizationMode::Dc, &seg, 500.0).unwrap();
        assert!((nc - 0.002).abs() < 1e-9);
    }

    #[test]
    fn raw_mode_is_unity() {
        let seg = segment();
        assert_eq!(
            resolve_norm_const(NormalizationMode::Raw, &seg, 500.0).unwrap(),
            1.0
        );
    }

    #[test]
    fn interval_mode_inverts_the_mean_power() {
        let seg = segment();
        // Bins 1..=31 all have power 4; bin 0 was overwritten to power 1.
        let nc = resolve_norm_const(
            NormalizationMode::AvgInterval {
                lo_bin: 1,
                hi_bin: 31,
            },
            &seg,
            500.0,
        )
        .unwrap();
        assert!((nc - 0.25).abs() < 1e-6);
    }

    #[test]
    fn interval_bounds_swap_when_reversed() {
        let seg = segment();
        let a = resolve_norm_const(
            NormalizationMode::AvgInterval {
                lo_bin: 31,
                hi_bin: 1,
            },
            &seg,
            500.0,
        )
        .unwrap();
        let b = resolve_norm_const(
            NormalizationMode::AvgInterval {
                lo_bin: 1,
                hi_bin: 31,
            },
            &seg,
            500.0,
        )
        .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn zero_mean_intervals_are_degenerate() {
        let amps = vec![Complex32::new(0.0, 0.0); 32];
        let seg = Segment::from_amps(16, amps).expect("segment");
        assert!(matches!(
            resolve_norm_const(
                NormalizationMode::AvgInterval {
                    lo_bin: 16,
                    hi_bin: 47
                },
                &seg,
                1.0
            ),
            Err(ExploreError::DegenerateStats(_))
        ));
    }

    #[test]
    fn intervals_outside_the_segment_are_refused() {
        let seg = segment();
        assert!(matches!(
            resolve_norm_const(
                NormalizationMode::AvgInterval {
                    lo_bin: 10,
                    hi_bin: 64
                },
                &seg,
                500.0
            ),
            Err(ExploreError::OutOfRange(_))
        ));
    }
}
