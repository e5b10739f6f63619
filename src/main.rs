//! Terminal front end for the FFT explorer core.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;

use fftexplore::dsp::{LOCAL_CHUNK, MAX_BINS};
use fftexplore::input::{AmplitudeFile, AmplitudeSource, InfMetadata};
use fftexplore::util::telemetry;
use fftexplore::{Candidate, Explorer, NormalizationMode, Segment, SessionParams};

#[derive(Parser)]
#[command(
    name = "fftexplore",
    about = "Interactively explore a precomputed search-mode FFT"
)]
struct Cli {
    /// Input spectrum: consecutive little-endian complex f32 bins ('.fft').
    fft_file: PathBuf,
}

const HELP: &str = "\
 Command            Effect
 -------            ------
 a                  Zoom in by a factor of 2
 x                  Zoom out by a factor of 2
 j                  Shift left by 15% of the window
 l                  Shift right by 15% of the window
 i                  Increase the power scale (make them taller)
 k                  Decrease the power scale (make them shorter)
 c                  Auto-scale the powers
 g <freq>           Go to a frequency (Hz)
 s <freq>           Select and optimize a frequency (Hz)
 n <m|d|r>          Renormalize: local median, DC amplitude, raw powers
 n u <lo> <hi>      Renormalize by the average power over bins [lo, hi]
 p                  Print the current view summary
 ?                  Show this help
 q                  Quit
";

fn main() -> Result<()> {
    telemetry::init();
    let cli = Cli::parse();

    if cli.fft_file.extension().and_then(|e| e.to_str()) != Some("fft") {
        bail!(
            "input file '{}' must be a FFT file ('.fft')",
            cli.fft_file.display()
        );
    }

    let inf_path = cli.fft_file.with_extension("inf");
    let metadata = InfMetadata::read(&inf_path)
        .with_context(|| format!("reading sidecar metadata '{}'", inf_path.display()))?;
    let mut reader = AmplitudeFile::open(&cli.fft_file)
        .with_context(|| format!("opening '{}'", cli.fft_file.display()))?;

    let params = SessionParams::new(metadata, reader.num_bins());
    match &params.object {
        Some(object) => info!(
            "Examining {} data from '{}'",
            object,
            cli.fft_file.display()
        ),
        None => info!("Examining data from '{}'", cli.fft_file.display()),
    }

    let num_amps = (reader.num_bins().min(MAX_BINS as u64) as usize / LOCAL_CHUNK) * LOCAL_CHUNK;
    let segment = Segment::read(&mut reader, 0, num_amps).context("loading the initial segment")?;
    let mut explorer = Explorer::new(params, segment).context("building the initial view")?;

    println!("{HELP}");
    print_view(&explorer);
    repl(&mut explorer)
}

fn repl(explorer: &mut Explorer) -> Result<()> {
    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let mut words = line.split_whitespace();
        let command = words.next().unwrap_or("");

        let outcome = match command {
            "a" => explorer.zoom_in(None).map(|_| true),
            "x" => explorer.zoom_out(None).map(|_| true),
            "j" => explorer.pan_left().map(|_| true),
            "l" => explorer.pan_right().map(|_| true),
            "i" => {
                explorer.increase_scale();
                Ok(true)
            }
            "k" => {
                explorer.decrease_scale();
                Ok(true)
            }
            "c" => {
                explorer.autoscale();
                Ok(true)
            }
            "g" => match parse_freq(words.next()) {
                Some(freq) => explorer.goto_frequency(freq).map(|_| true),
                None => {
                    println!("  usage: g <freq-hz>");
                    Ok(false)
                }
            },
            "s" => match parse_freq(words.next()) {
                Some(freq) => {
                    println!("  Searching for peak near {freq:.7} Hz...");
                    explorer.select_peak(freq).map(|cand| {
                        print_candidate(&cand, explorer.params());
                        true
                    })
                }
                None => {
                    println!("  usage: s <freq-hz>");
                    Ok(false)
                }
            },
            "n" => match parse_norm_mode(words.next(), words.next(), words.next()) {
                Some(mode) => explorer.set_normalization(mode).map(|_| true),
                None => {
                    println!("  usage: n <m|d|r> or n u <lo-bin> <hi-bin>");
                    Ok(false)
                }
            },
            "p" => {
                print_view(explorer);
                Ok(false)
            }
            "?" => {
                println!("{HELP}");
                Ok(false)
            }
            "q" => break,
            "" => Ok(false),
            other => {
                println!("  Unrecognized command '{other}' (? for help)");
                Ok(false)
            }
        };

        match outcome {
            Ok(true) => print_view(explorer),
            Ok(false) => {}
            // Recoverable core errors keep the previous view; just report.
            Err(e) => println!("  {e}"),
        }
    }

    println!("Done");
    Ok(())
}

fn parse_freq(word: Option<&str>) -> Option<f64> {
    word.and_then(|w| w.parse::<f64>().ok()).filter(|f| *f >= 0.0)
}

fn parse_norm_mode(
    mode: Option<&str>,
    lo: Option<&str>,
    hi: Option<&str>,
) -> Option<NormalizationMode> {
    match mode? {
        "m" => Some(NormalizationMode::Median),
        "d" => Some(NormalizationMode::Dc),
        "r" => Some(NormalizationMode::Raw),
        "u" => {
            let lo_bin = lo?.parse().ok()?;
            let hi_bin = hi?.parse().ok()?;
            Some(NormalizationMode::AvgInterval { lo_bin, hi_bin })
        }
        _ => None,
    }
}

fn print_view(explorer: &Explorer) {
    let view = explorer.view();
    let params = explorer.params();
    let t = params.duration();
    let lof = view.lor as f64 / t;
    let hif = (view.lor as f64 + view.dr * view.powers.len() as f64) / t;
    let (peak_r, peak_power) = view.peak();

    println!(
        "  view: {:.6} - {:.6} Hz  (bins {} - {}, zoom {})",
        lof,
        hif,
        view.lor,
        view.lor + view.num_bins as u64,
        view.zoom_level
    );
    println!(
        "  peak: {:.6} Hz at power {:.4}  (ceiling {:.4})",
        peak_r / t,
        peak_power,
        explorer.effective_ceiling()
    );
}

fn print_candidate(candidate: &Candidate, params: &SessionParams) {
    let freq = candidate.freq_hz(params);
    println!("  Refined candidate:");
    println!("    r     = {:.4} bins", candidate.r);
    println!("    freq  = {:.10} Hz", freq);
    println!("    period= {:.10} s", 1.0 / freq);
    println!("    z     = {:.4} bins/obs", candidate.z);
    println!("    fdot  = {:.6e} Hz/s", candidate.fdot_hz_s(params));
    println!("    power = {:.4}", candidate.power);
}
