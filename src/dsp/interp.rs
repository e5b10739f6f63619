//! Fourier interpolation between integer bins.
//!
//! The amplitudes in a segment are samples of a continuous response A(r). For
//! a constant-frequency signal the per-bin response is a phased sinc, and the
//! continuous value at fractional bin r is recovered by correlating the
//! amplitudes against that response over a bounded half-width. The
//! generalisation to a linearly-chirped signal (frequency derivative z bins
//! per observation) replaces the sinc with the stationary-phase integral
//!
//!   K(d, z) = integral over u in [0,1] of exp(2*pi*i*((d - z/2)*u + z*u^2/2))
//!
//! which this module evaluates by composite Simpson quadrature. At z = 0 the
//! integral collapses to the closed-form phased sinc.

use std::f64::consts::PI;

use num_complex::{Complex32, Complex64};

/// Half-width, in bins, of the truncated interpolation response (the
/// low-accuracy preset). Bins further than this from the evaluation point
/// contribute nothing.
pub const KERNEL_HALF_WIDTH: usize = 16;

fn sinc(x: f64) -> f64 {
    if x.abs() < 1e-12 {
        1.0
    } else {
        (PI * x).sin() / (PI * x)
    }
}

/// Interpolation weight for a bin at signed distance `d` from the evaluation
/// point, for a constant-frequency signal.
fn r_weight(d: f64) -> Complex64 {
    Complex64::from_polar(sinc(d), -PI * d)
}

/// Interpolation weight for a bin at distance `d` when the signal drifts by
/// `z` bins over the observation. Matches `r_weight` as z tends to zero.
fn rz_weight(d: f64, z: f64) -> Complex64 {
    if z.abs() < 1e-6 {
        return r_weight(d);
    }

    // Conjugated kernel integral by composite Simpson. The integrand
    // oscillates at most |d| + |z|/2 cycles over [0, 1]; the interval count
    // scales with that to hold the quadrature error well below the kernel
    // truncation error.
    let cycles = d.abs() + 0.5 * z.abs();
    let intervals = 2 * (32 + (16.0 * cycles).ceil() as usize);
    let h = 1.0 / intervals as f64;

    let phase = |u: f64| 2.0 * PI * ((d - 0.5 * z) * u + 0.5 * z * u * u);
    let mut sum = Complex64::from_polar(1.0, -phase(0.0)) + Complex64::from_polar(1.0, -phase(1.0));
    for i in 1..intervals {
        let weight = if i % 2 == 1 { 4.0 } else { 2.0 };
        sum += weight * Complex64::from_polar(1.0, -phase(i as f64 * h));
    }
    sum * (h / 3.0)
}

fn correlate(amps: &[Complex32], r: f64, z: f64, half_width: f64) -> Complex64 {
    let lo = (r - half_width).ceil().max(0.0) as usize;
    let hi = ((r + half_width).floor() as isize).min(amps.len() as isize - 1);
    if (lo as isize) > hi {
        return Complex64::new(0.0, 0.0);
    }

    let mut acc = Complex64::new(0.0, 0.0);
    for j in lo..=hi as usize {
        let a = amps[j];
        acc += Complex64::new(a.re as f64, a.im as f64) * rz_weight(r - j as f64, z);
    }
    acc
}

/// Continuous response at fractional bin `r` (relative to `amps[0]`) for a
/// signal with frequency derivative `z`. Positions outside the slice are
/// treated as zero amplitude.
pub fn rz_interp(amps: &[Complex32], r: f64, z: f64) -> Complex64 {
    let half_width = KERNEL_HALF_WIDTH as f64 + 0.5 * z.abs();
    correlate(amps, r, z, half_width)
}

/// Interpolated power |A(r, z)|^2.
pub fn rz_power(amps: &[Complex32], r: f64, z: f64) -> f64 {
    rz_interp(amps, r, z).norm_sqr()
}

/// Evaluate `count` constant-frequency (z = 0) interpolants starting at
/// fractional bin `start_r`, spaced `step` bins apart.
pub fn interpolate_span(
    amps: &[Complex32],
    start_r: f64,
    step: f64,
    count: usize,
) -> Vec<Complex64> {
    (0..count)
        .map(|i| correlate(amps, start_r + i as f64 * step, 0.0, KERNEL_HALF_WIDTH as f64))
        .collect()
}

/// First and second partial derivatives of the interpolated power surface
/// |A(r, z)|^2, evaluated by central differences.
#[derive(Debug, Clone, Copy)]
pub struct PowerDerivs {
    /// Power at the expansion point.
    pub power: f64,
    /// Phase (radians) at the expansion point.
    pub phase: f64,
    pub dp_dr: f64,
    pub d2p_dr2: f64,
    pub dp_dz: f64,
    pub d2p_dz2: f64,
    pub d2p_drdz: f64,
}

const DERIV_STEP_R: f64 = 1.0e-3;
const DERIV_STEP_Z: f64 = 1.0e-2;

pub fn power_derivs(amps: &[Complex32], r: f64, z: f64) -> PowerDerivs {
    let hr = DERIV_STEP_R;
    let hz = DERIV_STEP_Z;

    let center = rz_interp(amps, r, z);
    let p = center.norm_sqr();
    let p_rp = rz_power(amps, r + hr, z);
    let p_rm = rz_power(amps, r - hr, z);
    let p_zp = rz_power(amps, r, z + hz);
    let p_zm = rz_power(amps, r, z - hz);
    let p_pp = rz_power(amps, r + hr, z + hz);
    let p_pm = rz_power(amps, r + hr, z - hz);
    let p_mp = rz_power(amps, r - hr, z + hz);
    let p_mm = rz_power(amps, r - hr, z - hz);

    PowerDerivs {
        power: p,
        phase: center.im.atan2(center.re),
        dp_dr: (p_rp - p_rm) / (2.0 * hr),
        d2p_dr2: (p_rp - 2.0 * p + p_rm) / (hr * hr),
        dp_dz: (p_zp - p_zm) / (2.0 * hz),
        d2p_dz2: (p_zp - 2.0 * p + p_zm) / (hz * hz),
        d2p_drdz: (p_pp - p_pm - p_mp + p_mm) / (4.0 * hr * hz),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_positions_reproduce_the_amplitudes() {
        let amps: Vec<Complex32> = (0..64)
            .map(|i| Complex32::new((i + 1) as f32, -(i as f32)))
            .collect();
        let span = interpolate_span(&amps, 30.0, 1.0, 4);
        for (i, value) in span.iter().enumerate() {
            let expected = amps[30 + i];
            assert!((value.re - expected.re as f64).abs() < 1e-9);
            assert!((value.im - expected.im as f64).abs() < 1e-9);
        }
    }

    #[test]
    fn quadrature_matches_the_closed_form_at_small_z() {
        for &d in &[0.0, 0.3, -1.7, 4.25, -12.5] {
            let analytic = r_weight(d);
            let quadrature = rz_weight(d, 1.0e-5);
            assert!(
                (analytic - quadrature).norm() < 1e-4,
                "d = {d}: {analytic} vs {quadrature}"
            );
        }
    }

    #[test]
    fn tone_interpolates_to_its_amplitude_at_the_peak() {
        let amps = testutil::tone(256, 100.4, 50.0);
        let peak = rz_interp(&amps, 100.4, 0.0);
        assert!(
            (peak.norm() - 50.0).abs() < 0.5,
            "peak magnitude {}",
            peak.norm()
        );
    }

    #[test]
    fn tone_power_falls_off_away_from_the_peak() {
        let amps = testutil::tone(256, 100.4, 50.0);
        let at_peak = rz_power(&amps, 100.4, 0.0);
        let off_peak = rz_power(&amps, 101.4, 0.0);
        assert!(at_peak > 100.0 * off_peak.max(1e-12));
    }

    #[test]
    fn out_of_range_taps_are_silent() {
        let amps = vec![Complex32::new(1.0, 0.0); 8];
        // Evaluation close to the edge must not panic and stays bounded.
        let edge = rz_interp(&amps, 0.25, 0.0);
        assert!(edge.norm() < 16.0);
        let outside = rz_interp(&amps, -40.0, 0.0);
        assert_eq!(outside, Complex64::new(0.0, 0.0));
    }

    #[test]
    fn power_derivs_vanish_at_a_tone_peak() {
        let amps = testutil::tone(256, 100.0, 10.0);
        let derivs = power_derivs(&amps, 100.0, 0.0);
        assert!((derivs.power - 100.0).abs() < 1.0);
        assert!(derivs.dp_dr.abs() < 0.5, "dp_dr = {}", derivs.dp_dr);
        assert!(derivs.d2p_dr2 < 0.0, "d2p_dr2 = {}", derivs.d2p_dr2);
        assert!(derivs.d2p_dz2 < 0.0, "d2p_dz2 = {}", derivs.d2p_dz2);
    }
}
