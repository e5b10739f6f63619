//! End-to-end session tests over a synthetic on-disk spectrum.

use std::f64::consts::PI;
use std::io::Write;
use std::path::PathBuf;

use num_complex::Complex32;
use tempfile::TempDir;

use fftexplore::dsp::view::build_view;
use fftexplore::input::{AmplitudeFile, AmplitudeSource, InfMetadata};
use fftexplore::{Explorer, NormalizationMode, Segment, SessionParams};

const NUM_BINS: usize = 4096;
const TONE_R: f64 = 1337.25;
const TONE_AMP: f64 = 200.0;

fn sinc(x: f64) -> f64 {
    if x.abs() < 1e-12 {
        1.0
    } else {
        (PI * x).sin() / (PI * x)
    }
}

/// Amplitude of the flat floor keeping every chunk median positive. Small
/// next to the tone so it barely perturbs the peak position.
const FLOOR_AMP: f64 = 0.02;

/// Sampled phased-sinc response of a pure tone over a flat floor.
fn synthetic_spectrum() -> Vec<Complex32> {
    (0..NUM_BINS)
        .map(|j| {
            let d = TONE_R - j as f64;
            let re = TONE_AMP * sinc(d) * (PI * d).cos() + FLOOR_AMP;
            let im = TONE_AMP * sinc(d) * (PI * d).sin();
            Complex32::new(re as f32, im as f32)
        })
        .collect()
}

/// Write `<stem>.fft` and `<stem>.inf` for a session with T = 1 s.
fn write_session_files(dir: &TempDir) -> (PathBuf, PathBuf) {
    let fft_path = dir.path().join("synthetic.fft");
    let inf_path = dir.path().join("synthetic.inf");

    let mut fft = std::fs::File::create(&fft_path).expect("create fft");
    for amp in synthetic_spectrum() {
        fft.write_all(&amp.re.to_le_bytes()).unwrap();
        fft.write_all(&amp.im.to_le_bytes()).unwrap();
    }
    fft.flush().unwrap();

    let dt = 1.0 / (2 * NUM_BINS) as f64;
    let inf = format!(
        " Data file name without suffix          =  synthetic\n\
         \x20Object being observed                  =  FAKE_PSR\n\
         \x20Number of bins in the time series      =  {}\n\
         \x20Width of each time series bin (sec)    =  {:.16}\n",
        2 * NUM_BINS,
        dt
    );
    std::fs::write(&inf_path, inf).expect("write inf");

    (fft_path, inf_path)
}

fn open_session() -> (SessionParams, Segment) {
    let dir = TempDir::new().expect("temp dir");
    let (fft_path, inf_path) = write_session_files(&dir);

    let metadata = InfMetadata::read(&inf_path).expect("metadata");
    assert_eq!(metadata.object.as_deref(), Some("FAKE_PSR"));

    let mut reader = AmplitudeFile::open(&fft_path).expect("open fft");
    assert_eq!(reader.num_bins(), NUM_BINS as u64);

    let params = SessionParams::new(metadata, NUM_BINS as u64);
    let segment = Segment::read(&mut reader, 0, NUM_BINS).expect("segment");
    (params, segment)
}

#[test]
fn session_duration_makes_bins_and_hertz_coincide() {
    let (params, _) = open_session();
    assert!((params.duration() - 1.0).abs() < 1e-9);
}

#[test]
fn file_backed_views_and_refinement_find_the_tone() {
    let (params, segment) = open_session();
    let mut explorer = Explorer::new(params, segment).expect("explorer");

    // The initial view covers the whole 4096-bin spectrum and already shows
    // the tone as its strongest sample.
    assert_eq!(explorer.view().num_bins, NUM_BINS);
    let (peak_r, _) = explorer.view().peak();
    assert!((peak_r - TONE_R).abs() <= explorer.view().dr);

    // Click near the tone: the candidate lands within a millibin.
    let candidate = explorer.select_peak(1337.0).expect("candidate");
    assert!((candidate.r - TONE_R).abs() < 1e-3, "r = {}", candidate.r);
    assert!(candidate.z.abs() < 1e-2, "z = {}", candidate.z);
    assert!(
        (candidate.power.sqrt() - TONE_AMP).abs() < 2.0,
        "power = {}",
        candidate.power
    );

    // Selection re-centered the view onto the refined candidate.
    assert!((explorer.view().center_r - candidate.r).abs() < 1e-9);
}

#[test]
fn renormalisation_rescales_a_rebuilt_view() {
    let (_params, segment) = open_session();

    let raw = build_view(&segment, 1337.0, 3, 1.0).expect("raw view");
    let dc = build_view(&segment, 1337.0, 3, 0.5).expect("scaled view");
    for (a, b) in raw.powers.iter().zip(&dc.powers) {
        assert!((a * 0.5 - b).abs() <= 1e-6 * a.abs().max(1.0));
    }
}

#[test]
fn interval_normalisation_uses_the_mean_power() {
    let (params, segment) = open_session();

    let quiet = &segment.raw_powers()[100..200];
    let mean = quiet.iter().map(|&p| p as f64).sum::<f64>() / quiet.len() as f64;

    let mut explorer = Explorer::new(params, segment).expect("explorer");
    explorer
        .set_normalization(NormalizationMode::AvgInterval {
            lo_bin: 100,
            hi_bin: 199,
        })
        .expect("norm");
    assert!(
        (explorer.norm_const() as f64 * mean - 1.0).abs() < 1e-4,
        "norm_const = {}, mean = {}",
        explorer.norm_const(),
        mean
    );
}
