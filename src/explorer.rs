//! Session controller translating user events into core operations.
//!
//! Holds the mutable session state (current center, zoom, normalisation and
//! display ceiling) around one immutable segment, and applies the recovery
//! rule for out-of-range requests: the previous view stays current.

use tracing::{info, warn};

use crate::dsp::norm::{resolve_norm_const, NormalizationMode};
use crate::dsp::peak::{refine_peak, Candidate};
use crate::dsp::segment::Segment;
use crate::dsp::view::{build_view, FftView};
use crate::dsp::{INITIAL_NUM_BINS, LOG_DISPLAY_NUM, MAX_ZOOM, MIN_ZOOM};
use crate::error::Result;
use crate::session::SessionParams;

/// Fraction of the view width panned per shift event.
const PAN_FRAC: f64 = 0.15;
/// Ceiling growth factor per scale-down event (its inverse scales up).
const SCALE_STEP: f32 = 4.0 / 3.0;
/// Headroom applied above the view maximum when the ceiling latches.
const AUTOSCALE_HEADROOM: f32 = 1.1;

fn floor_log2(n: usize) -> i32 {
    debug_assert!(n > 0);
    (usize::BITS - 1 - n.leading_zeros()) as i32
}

pub struct Explorer {
    params: SessionParams,
    segment: Segment,
    view: FftView,
    center_r: f64,
    zoom_level: i32,
    norm_const: f32,
    display_ceiling: Option<f32>,
    dc_amplitude: f32,
}

impl Explorer {
    /// Start a session over `segment` with the default median normalisation,
    /// viewing the first INITIAL_NUM_BINS bins (or the whole segment when it
    /// is smaller than that).
    pub fn new(params: SessionParams, segment: Segment) -> Result<Self> {
        let span = INITIAL_NUM_BINS.min(1 << floor_log2(segment.num_amps()));
        let zoom_level = LOG_DISPLAY_NUM - floor_log2(span);
        let center_r = segment.rlo() as f64 + 0.5 * span as f64;
        let dc_amplitude = segment.dc_amplitude().unwrap_or(0.0);

        let view = build_view(&segment, center_r, zoom_level, 0.0)?;
        Ok(Self {
            params,
            segment,
            view,
            center_r,
            zoom_level,
            norm_const: 0.0,
            display_ceiling: None,
            dc_amplitude,
        })
    }

    pub fn params(&self) -> &SessionParams {
        &self.params
    }

    pub fn segment(&self) -> &Segment {
        &self.segment
    }

    pub fn view(&self) -> &FftView {
        &self.view
    }

    pub fn zoom_level(&self) -> i32 {
        self.zoom_level
    }

    pub fn norm_const(&self) -> f32 {
        self.norm_const
    }

    /// The display-clipping ceiling; `None` means auto-scale.
    pub fn display_ceiling(&self) -> Option<f32> {
        self.display_ceiling
    }

    /// The ceiling a plot surface should use right now.
    pub fn effective_ceiling(&self) -> f32 {
        self.display_ceiling
            .unwrap_or(AUTOSCALE_HEADROOM * self.view.max_power)
    }

    /// Rebuild the view; on failure the previous view and state remain.
    fn try_rebuild(&mut self, center_r: f64, zoom_level: i32) -> Result<()> {
        match build_view(&self.segment, center_r, zoom_level, self.norm_const) {
            Ok(view) => {
                self.view = view;
                self.center_r = center_r;
                self.zoom_level = zoom_level;
                Ok(())
            }
            Err(e) => {
                warn!("[explorer] keeping previous view: {e}");
                Err(e)
            }
        }
    }

    /// Zoom in one level, optionally re-centering on a frequency first.
    pub fn zoom_in(&mut self, at_freq_hz: Option<f64>) -> Result<()> {
        if self.zoom_level >= MAX_ZOOM {
            info!("[explorer] already at maximum zoom level ({})", self.zoom_level);
            return Ok(());
        }
        let center = at_freq_hz
            .map(|f| self.params.freq_to_bin(f))
            .unwrap_or(self.center_r);
        self.try_rebuild(center, self.zoom_level + 1)
    }

    /// Zoom out one level, optionally re-centering on a frequency first.
    pub fn zoom_out(&mut self, at_freq_hz: Option<f64>) -> Result<()> {
        if self.zoom_level <= MIN_ZOOM {
            info!("[explorer] already at minimum zoom level ({})", self.zoom_level);
            return Ok(());
        }
        let center = at_freq_hz
            .map(|f| self.params.freq_to_bin(f))
            .unwrap_or(self.center_r);
        self.try_rebuild(center, self.zoom_level - 1)
    }

    /// Shift the window left by 15% of its width.
    pub fn pan_left(&mut self) -> Result<()> {
        let center = self.center_r - PAN_FRAC * self.view.num_bins as f64;
        self.try_rebuild(center, self.zoom_level)
    }

    /// Shift the window right by 15% of its width.
    pub fn pan_right(&mut self) -> Result<()> {
        let center = self.center_r + PAN_FRAC * self.view.num_bins as f64;
        self.try_rebuild(center, self.zoom_level)
    }

    /// Center the window on a frequency in Hz.
    pub fn goto_frequency(&mut self, freq_hz: f64) -> Result<()> {
        self.try_rebuild(self.params.freq_to_bin(freq_hz), self.zoom_level)
    }

    /// Make the powers taller: lower the display ceiling to 3/4 of its
    /// current effective value. Latches auto-scale off.
    pub fn increase_scale(&mut self) {
        let current = self.effective_ceiling();
        if self.display_ceiling.is_none() {
            info!("[explorer] auto-scaling is off");
        }
        self.display_ceiling = Some(current / SCALE_STEP);
    }

    /// Make the powers shorter: raise the display ceiling to 4/3 of its
    /// current effective value. Latches auto-scale off.
    pub fn decrease_scale(&mut self) {
        let current = self.effective_ceiling();
        if self.display_ceiling.is_none() {
            info!("[explorer] auto-scaling is off");
        }
        self.display_ceiling = Some(current * SCALE_STEP);
    }

    /// Re-enable auto-scaling of the display ceiling.
    pub fn autoscale(&mut self) {
        if self.display_ceiling.take().is_some() {
            info!("[explorer] auto-scaling is on");
        }
    }

    /// Switch the normalisation policy, re-enable auto-scale, and rebuild
    /// the current view. On failure the previous policy stays active.
    pub fn set_normalization(&mut self, mode: NormalizationMode) -> Result<()> {
        let norm_const = resolve_norm_const(mode, &self.segment, self.dc_amplitude)?;
        let previous = self.norm_const;
        self.norm_const = norm_const;
        if let Err(e) = self.try_rebuild(self.center_r, self.zoom_level) {
            self.norm_const = previous;
            return Err(e);
        }
        self.display_ceiling = None;
        Ok(())
    }

    /// Refine the candidate nearest `freq_hz`, then re-center on it and zoom
    /// in one level. The refined candidate is returned even when the
    /// re-centered view cannot be built.
    pub fn select_peak(&mut self, freq_hz: f64) -> Result<Candidate> {
        let candidate = refine_peak(&self.segment, freq_hz, self.view.num_bins, &self.params)?;
        let zoom = (self.zoom_level + 1).min(MAX_ZOOM);
        let _ = self.try_rebuild(candidate.r, zoom);
        Ok(candidate)
    }
}
