//! Feature detection over a single trace: onset, peak, rate-computation
//! windows and baseline return.
//!
//! Detectors are pure scans over the trace; fallbacks (no onset / no peak
//! found within bounds) are soft warnings, not errors. All derived indices
//! live in [`IndexState`], whose transition methods return a new state so a
//! response stays shareable across parallel batch workers.

use tracing::warn;

use crate::config::DetectionConfig;
use crate::error::{CalTraceError, Result};
use crate::math::series::{abs_deltas, mean, std};
use crate::trace::Trace;

/// Baseline fluorescence level after F0 normalization.
pub const BASELINE_LEVEL: f64 = 1.0;

/// All derived indices of one response, in frame numbers.
///
/// Invariant: `onset_idx <= influx_end_idx < eflux_start_idx <=
/// eflux_end_idx` and `baseline_return_idx >= eflux_start_idx`, with
/// `influx_end_idx = peak_idx - influx_end_offset_from_peak`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexState {
    pub onset_idx: i64,
    pub peak_idx: i64,
    pub influx_start_idx: i64,
    pub influx_end_idx: i64,
    pub eflux_start_idx: i64,
    pub eflux_end_idx: i64,
    pub baseline_return_idx: i64,
}

impl IndexState {
    /// Runs full detection over a trace.
    pub fn derive(
        trace: &Trace,
        config: &DetectionConfig,
        name: &str,
        warnings: &mut Vec<String>,
    ) -> Result<Self> {
        let onset_idx = detect_onset_index(trace, config, name, warnings)?;
        let peak_idx = detect_peak_index(trace, config, onset_idx, name, warnings)?;
        Ok(Self::from_onset_and_peak(trace, config, onset_idx, peak_idx))
    }

    /// Rebuilds every index that depends on the peak. Applying the same peak
    /// twice yields the same state.
    pub fn with_peak(&self, trace: &Trace, config: &DetectionConfig, peak_idx: i64) -> Self {
        Self::from_onset_and_peak(trace, config, self.onset_idx, peak_idx)
    }

    /// Rebuilds every index that depends on the onset (the influx window
    /// start). Idempotent.
    pub fn with_onset(&self, onset_idx: i64) -> Self {
        Self {
            onset_idx,
            influx_start_idx: onset_idx,
            ..*self
        }
    }

    /// Translates all indices by `k` frames, clamping the baseline return to
    /// the trace's last valid frame. `last_frame` is the last frame of the
    /// trace *after* its own shift.
    pub fn shifted(&self, k: i64, last_frame: i64) -> Self {
        Self {
            onset_idx: self.onset_idx + k,
            peak_idx: self.peak_idx + k,
            influx_start_idx: self.influx_start_idx + k,
            influx_end_idx: self.influx_end_idx + k,
            eflux_start_idx: self.eflux_start_idx + k,
            eflux_end_idx: self.eflux_end_idx + k,
            baseline_return_idx: (self.baseline_return_idx + k).min(last_frame),
        }
    }

    fn from_onset_and_peak(
        trace: &Trace,
        config: &DetectionConfig,
        onset_idx: i64,
        peak_idx: i64,
    ) -> Self {
        let eflux_start_idx = peak_idx + config.eflux_start_offset_from_peak;
        Self {
            onset_idx,
            peak_idx,
            influx_start_idx: onset_idx,
            influx_end_idx: peak_idx - config.influx_end_offset_from_peak,
            eflux_start_idx,
            eflux_end_idx: detect_eflux_end_index(trace, config, eflux_start_idx),
            baseline_return_idx: detect_baseline_return_index(trace, eflux_start_idx),
        }
    }
}

/// First frame in `[min_onset, max_onset)` whose delta to the next sample
/// exceeds the baseline noise threshold `mean + z * std` of the baseline
/// window's absolute sample-to-sample deltas. Falls back to `min_onset` with
/// a warning when no frame qualifies.
pub fn detect_onset_index(
    trace: &Trace,
    config: &DetectionConfig,
    name: &str,
    warnings: &mut Vec<String>,
) -> Result<i64> {
    let baseline_start = config.min_onset - config.baseline_window;
    if baseline_start < trace.first_frame() {
        return Err(CalTraceError::InvalidWindow {
            what: "onset baseline window",
            start: baseline_start,
            end: config.min_onset,
        });
    }
    let baseline: Vec<f64> = trace
        .window(baseline_start, config.min_onset - 1, "onset baseline window")?
        .into_iter()
        .map(|(_, v)| v)
        .collect();
    let deltas = abs_deltas(&baseline);
    let threshold = mean(&deltas) + config.onset_z_threshold * std(&deltas);

    let stop = config.max_onset.min(trace.last_frame());
    let mut frame = config.min_onset;
    while frame < stop {
        let here = trace.value_at(frame);
        let next = trace.value_at(frame + 1);
        if let (Some(a), Some(b)) = (here, next) {
            if (b - a).abs() > threshold {
                return Ok(frame);
            }
        }
        frame += 1;
    }

    warn!(response = name, "no onset detected within bounds, falling back to search start");
    warnings.push(format!(
        "no onset detected for '{}' within [{}, {})",
        name, config.min_onset, config.max_onset
    ));
    Ok(config.min_onset)
}

/// First local maximum after the onset that clears the baseline by
/// `threshold_factor` standard deviations. A local maximum is strictly
/// greater than every neighbor within `peak_sliding_window` frames on each
/// side. Falls back to the global maximum of the search range with a warning.
pub fn detect_peak_index(
    trace: &Trace,
    config: &DetectionConfig,
    onset_idx: i64,
    name: &str,
    warnings: &mut Vec<String>,
) -> Result<i64> {
    let baseline_start = onset_idx - config.baseline_window;
    let baseline: Vec<f64> = trace
        .window(baseline_start, onset_idx - 1, "peak baseline window")?
        .into_iter()
        .map(|(_, v)| v)
        .collect();
    let floor = mean(&baseline) + config.peak_threshold_factor * std(&baseline);

    let sw = config.peak_sliding_window;
    let ceiling = config.peak_search_ceiling.min(trace.last_frame());
    let mut frame = onset_idx + sw;
    while frame <= ceiling - sw {
        if let Some(current) = trace.value_at(frame) {
            if current > floor && is_strict_local_max(trace, frame, sw, current) {
                return Ok(frame);
            }
        }
        frame += 1;
    }

    warn!(response = name, "no peak detected within bounds, falling back to global maximum");
    warnings.push(format!(
        "no peak detected for '{}' within [{}, {}], using global maximum",
        name, onset_idx, ceiling
    ));
    trace
        .max_frame_in(onset_idx, ceiling)
        .ok_or(CalTraceError::InvalidWindow {
            what: "peak search range",
            start: onset_idx,
            end: ceiling,
        })
}

fn is_strict_local_max(trace: &Trace, frame: i64, sliding_window: i64, current: f64) -> bool {
    let mut neighbor = frame - sliding_window;
    while neighbor <= frame + sliding_window {
        if neighbor != frame {
            if let Some(v) = trace.value_at(neighbor) {
                if v >= current {
                    return false;
                }
            }
        }
        neighbor += 1;
    }
    true
}

/// Scans backward from `eflux_start + max_offset` (clipped to the trace end)
/// and returns the first frame at or below baseline, else the minimum-offset
/// bound.
pub fn detect_eflux_end_index(trace: &Trace, config: &DetectionConfig, eflux_start_idx: i64) -> i64 {
    let floor = (eflux_start_idx + config.eflux_end_min_offset_from_start).min(trace.last_frame());
    let mut frame = (eflux_start_idx + config.eflux_end_max_offset_from_start).min(trace.last_frame());
    while frame > floor {
        match trace.value_at(frame) {
            Some(v) if v <= BASELINE_LEVEL => return frame,
            _ => frame -= 1,
        }
    }
    floor
}

/// First frame from the eflux start whose value is at or below baseline,
/// else the trace's last frame.
pub fn detect_baseline_return_index(trace: &Trace, eflux_start_idx: i64) -> i64 {
    let last = trace.last_frame();
    let mut frame = eflux_start_idx.max(trace.first_frame());
    while frame <= last {
        if let Some(v) = trace.value_at(frame) {
            if v <= BASELINE_LEVEL {
                return frame;
            }
        }
        frame += 1;
    }
    last
}
