//! Refining a coarse frequency selection to fractional-bin precision.

use tracing::debug;

use crate::dsp::interp::{power_derivs, rz_power, PowerDerivs};
use crate::dsp::segment::Segment;
use crate::error::{ExploreError, Result};
use crate::session::SessionParams;

/// Fraction of the view width scanned for the raw-power seed bin.
const VIEW_FRAC: f64 = 0.05;
/// Half-width of the continuous search in r around the seed bin.
const R_SPAN: f64 = 0.5;
/// Half-width of the continuous search in z around the current point.
const Z_SPAN: f64 = 5.0;
const R_TOL: f64 = 1.0e-5;
const Z_TOL: f64 = 1.0e-3;
const MAX_ROUNDS: usize = 30;

/// A refined candidate: the (r, z) maximising interpolated power, expressed
/// in absolute bins, together with the local power-surface derivatives.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Fractional bin of the power maximum.
    pub r: f64,
    /// Frequency derivative at the maximum, in bins per observation.
    pub z: f64,
    /// Interpolated power at the maximum.
    pub power: f64,
    /// Power-surface partials at (r, z) for Taylor-expansion statistics.
    pub derivs: PowerDerivs,
}

impl Candidate {
    /// Candidate frequency in Hz.
    pub fn freq_hz(&self, params: &SessionParams) -> f64 {
        params.bin_to_freq(self.r)
    }

    /// Candidate frequency derivative in Hz/s.
    pub fn fdot_hz_s(&self, params: &SessionParams) -> f64 {
        let t = params.duration();
        self.z / (t * t)
    }
}

fn golden_max<F: Fn(f64) -> f64>(f: F, mut a: f64, mut b: f64, tol: f64) -> f64 {
    const INV_PHI: f64 = 0.618_033_988_749_894_8;

    let mut c = b - INV_PHI * (b - a);
    let mut d = a + INV_PHI * (b - a);
    let mut fc = f(c);
    let mut fd = f(d);
    while (b - a) > tol {
        if fc > fd {
            b = d;
            d = c;
            fd = fc;
            c = b - INV_PHI * (b - a);
            fc = f(c);
        } else {
            a = c;
            c = d;
            fc = fd;
            d = a + INV_PHI * (b - a);
            fd = f(d);
        }
    }
    0.5 * (a + b)
}

/// Alternating 1-D maximisation of |A(r, z)|^2, re-bracketing around the
/// running optimum until neither coordinate moves.
fn maximize_rz(amps: &[num_complex::Complex32], r_seed: f64) -> (f64, f64, f64) {
    let mut r = r_seed;
    let mut z = 0.0;

    for _ in 0..MAX_ROUNDS {
        let next_r = golden_max(|x| rz_power(amps, x, z), r - R_SPAN, r + R_SPAN, R_TOL);
        let next_z = golden_max(|x| rz_power(amps, next_r, x), z - Z_SPAN, z + Z_SPAN, Z_TOL);
        let converged = (next_r - r).abs() < 2.0 * R_TOL && (next_z - z).abs() < 2.0 * Z_TOL;
        r = next_r;
        z = next_z;
        if converged {
            break;
        }
    }

    (r, z, rz_power(amps, r, z))
}

/// Refine the candidate nearest `freq_hz`.
///
/// Scans raw powers over a ±(VIEW_FRAC/2)·`view_num_bins` window around the
/// click (ties broken toward the lowest bin), then maximises the
/// analytically-interpolated power over continuous (r, z).
pub fn refine_peak(
    segment: &Segment,
    freq_hz: f64,
    view_num_bins: usize,
    params: &SessionParams,
) -> Result<Candidate> {
    let inr = params.freq_to_bin(freq_hz);
    let half = 0.5 * VIEW_FRAC * view_num_bins as f64;

    let lobin = ((inr - half).floor() as i64).max(segment.rlo() as i64) as u64;
    let hibin = ((inr + half).floor() as i64).min(segment.rhi() as i64 - 1);
    if hibin < lobin as i64 {
        return Err(ExploreError::NoRefinement);
    }

    let mut max_power = 0.0f32;
    let mut seed_bin = None;
    for bin in lobin..=hibin as u64 {
        let power = segment.raw_powers()[(bin - segment.rlo()) as usize];
        if power > max_power {
            max_power = power;
            seed_bin = Some(bin);
        }
    }
    let Some(seed_bin) = seed_bin else {
        return Err(ExploreError::NoRefinement);
    };

    let seed_rel = (seed_bin - segment.rlo()) as f64;
    let (r_rel, z, power) = maximize_rz(segment.amps(), seed_rel);
    let derivs = power_derivs(segment.amps(), r_rel, z);
    let r = r_rel + segment.rlo() as f64;

    debug!(
        "[peak] seed bin {} -> r {:.6} z {:.4} power {:.4e}",
        seed_bin, r, z, power
    );

    Ok(Candidate {
        r,
        z,
        power,
        derivs,
    })
}
