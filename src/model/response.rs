//! A single region of interest: one trace, its detected indices and the
//! metrics derived from them.

use tracing::warn;

use crate::config::DetectionConfig;
use crate::detect::{IndexState, BASELINE_LEVEL};
use crate::error::{CalTraceError, Result};
use crate::math::regression::linear_fit;
use crate::math::series::trapezoid;
use crate::schema::MetricKind;
use crate::trace::Trace;

/// Fraction of the peak amplitude that defines the tau crossing
/// (1/e of the decay).
const TAU_AMPLITUDE_FRACTION: f64 = 0.368;

#[derive(Debug, Clone)]
pub struct Response {
    pub response_id: u32,
    pub sample_id: u32,
    pub group_label: String,
    trace: Trace,
    state: IndexState,
    config: DetectionConfig,
    /// Soft warnings raised during construction-time detection.
    warnings: Vec<String>,
}

impl Response {
    /// Builds a response and runs feature detection on its trace.
    pub fn new(
        response_id: u32,
        sample_id: u32,
        group_label: impl Into<String>,
        trace: Trace,
        config: DetectionConfig,
    ) -> Result<Self> {
        let group_label = group_label.into();
        let name = format!("cs-{}_roi-{}", sample_id, response_id);
        let mut warnings = Vec::new();
        let state = IndexState::derive(&trace, &config, &name, &mut warnings)?;
        Ok(Self {
            response_id,
            sample_id,
            group_label,
            trace,
            state,
            config,
            warnings,
        })
    }

    pub fn name(&self) -> String {
        format!("cs-{}_roi-{}", self.sample_id, self.response_id)
    }

    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    pub fn indices(&self) -> &IndexState {
        &self.state
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Manual peak correction: re-derives the influx end, eflux window and
    /// baseline return from the new peak.
    pub fn set_peak_idx(&mut self, peak_idx: i64) {
        self.state = self.state.with_peak(&self.trace, &self.config, peak_idx);
    }

    /// Manual onset correction: re-derives the influx start.
    pub fn set_onset_idx(&mut self, onset_idx: i64) {
        self.state = self.state.with_onset(onset_idx);
    }

    /// Translates trace and indices in lockstep by `k` frames.
    pub fn shift(&mut self, k: i64) {
        self.trace.shift(k);
        self.state = self.state.shifted(k, self.trace.last_frame());
    }

    /// Peak fluorescence above baseline.
    pub fn amplitude(&self) -> f64 {
        self.trace
            .value_at(self.state.peak_idx)
            .map_or(f64::NAN, |v| v - BASELINE_LEVEL)
    }

    /// Slope of the line fit over the influx window; physically the signal
    /// rises here, so a non-positive slope is warned about.
    pub fn influx_rate(&self, warnings: &mut Vec<String>) -> Result<f64> {
        let fit = linear_fit(&self.trace, self.state.influx_start_idx, self.state.influx_end_idx)?;
        if fit.slope <= 0.0 {
            warn!(response = %self.name(), slope = fit.slope, "influx rate is non-positive");
            warnings.push(format!("influx rate non-positive for '{}'", self.name()));
        }
        Ok(fit.slope)
    }

    /// Slope of the line fit over the eflux window; physically the signal
    /// decays here, so a non-negative slope is warned about.
    pub fn eflux_rate(&self, warnings: &mut Vec<String>) -> Result<f64> {
        let fit = linear_fit(&self.trace, self.state.eflux_start_idx, self.state.eflux_end_idx)?;
        if fit.slope >= 0.0 {
            warn!(response = %self.name(), slope = fit.slope, "eflux rate is non-negative");
            warnings.push(format!("eflux rate non-negative for '{}'", self.name()));
        }
        Ok(fit.slope)
    }

    /// Trapezoidal integral of the trace from onset to baseline return,
    /// against the time axis when the trace carries one.
    pub fn integral(&self) -> Result<f64> {
        let points = self.trace.window(
            self.state.onset_idx,
            self.state.baseline_return_idx,
            "integral window",
        )?;
        if points.len() < 2 {
            return Err(CalTraceError::InvalidWindow {
                what: "integral window",
                start: self.state.onset_idx,
                end: self.state.baseline_return_idx,
            });
        }
        let mut x = Vec::with_capacity(points.len());
        let mut y = Vec::with_capacity(points.len());
        for (frame, v) in points {
            // time_at is defined for every frame the window yielded
            x.push(self.trace.time_at(frame).unwrap_or(frame as f64));
            y.push(v);
        }
        Ok(trapezoid(&y, &x))
    }

    /// Decay time constant: elapsed time from the peak to the first frame at
    /// or below `1 + 0.368 * amplitude`; elapsed time to the baseline return
    /// when the crossing is never reached.
    pub fn tau(&self) -> Result<f64> {
        let peak_value = self
            .trace
            .value_at(self.state.peak_idx)
            .ok_or(CalTraceError::InvalidWindow {
                what: "tau peak lookup",
                start: self.state.peak_idx,
                end: self.state.peak_idx + 1,
            })?;
        let crossing = BASELINE_LEVEL + TAU_AMPLITUDE_FRACTION * (peak_value - BASELINE_LEVEL);
        let peak_time = self
            .trace
            .time_at(self.state.peak_idx)
            .unwrap_or(self.state.peak_idx as f64);

        let mut frame = self.state.peak_idx + 1;
        let last = self.trace.last_frame();
        while frame <= last {
            if let Some(v) = self.trace.value_at(frame) {
                if v <= crossing {
                    let t = self.trace.time_at(frame).unwrap_or(frame as f64);
                    return Ok(t - peak_time);
                }
            }
            frame += 1;
        }

        let t = self
            .trace
            .time_at(self.state.baseline_return_idx)
            .unwrap_or(self.state.baseline_return_idx as f64);
        Ok(t - peak_time)
    }

    /// One metric by kind; a degenerate window becomes `None` with a warning
    /// so batch aggregation never aborts.
    pub fn metric(&self, kind: MetricKind, warnings: &mut Vec<String>) -> Option<f64> {
        let result = match kind {
            MetricKind::Amplitude => return Some(self.amplitude()),
            MetricKind::Influx => self.influx_rate(warnings),
            MetricKind::Eflux => self.eflux_rate(warnings),
            MetricKind::Integral => self.integral(),
            MetricKind::Tau => self.tau(),
        };
        match result {
            Ok(v) => Some(v),
            Err(err) => {
                warn!(response = %self.name(), %err, "metric skipped");
                warnings.push(format!("metric skipped for '{}': {}", self.name(), err));
                None
            }
        }
    }

    /// Re-runs full detection, discarding any manual overrides. Used after
    /// trace-level edits.
    pub fn redetect(&mut self) -> Result<()> {
        let name = self.name();
        let mut warnings = Vec::new();
        self.state = IndexState::derive(&self.trace, &self.config, &name, &mut warnings)?;
        self.warnings = warnings;
        Ok(())
    }
}
