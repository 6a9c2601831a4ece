//! Deterministic preprocessing pipeline: raw table in, normalized
//! baseline-relative table out.
//!
//! The pipeline is pure with respect to the caller's table; every run clones
//! the input and applies its steps in a fixed order. Optional QC steps
//! correct overshooting samples and reject corrupted columns, emitting soft
//! warnings rather than errors.

use std::time::Instant;

use tracing::{info, warn};

use crate::config::{PreprocessConfig, QcConfig};
use crate::error::Result;
use crate::math::series::{leading_local_maxima, mean, moving_average_centered, nan_max};
use crate::table::Table;

trait Step {
    fn name(&self) -> &'static str;
    fn apply(&self, table: &mut Table, warnings: &mut Vec<String>) -> Result<()>;
}

pub struct Preprocessor {
    config: PreprocessConfig,
}

impl Preprocessor {
    pub fn new(config: PreprocessConfig) -> Self {
        Self { config }
    }

    /// Runs the full pipeline over a copy of `table`. Returns the processed
    /// table together with the QC warnings raised along the way.
    pub fn run(&self, table: &Table) -> Result<(Table, Vec<String>)> {
        let mut table = table.clone();
        table.sort_columns();
        let mut warnings = Vec::new();
        for step in self.steps() {
            let start = Instant::now();
            step.apply(&mut table, &mut warnings)?;
            info!(
                step = step.name(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "preprocess step finished"
            );
        }
        Ok((table, warnings))
    }

    fn steps(&self) -> Vec<Box<dyn Step>> {
        let c = &self.config;
        let mut steps: Vec<Box<dyn Step>> = vec![
            Box::new(DiscardLeadingRows(c.first_n_points_to_discard)),
            Box::new(Smooth(c.smoothing_window_size)),
            Box::new(SubtractBackground),
        ];
        if let Some(qc) = &c.qc {
            steps.push(Box::new(OvershootCorrect(qc.clone())));
            steps.push(Box::new(NoisyPreRiseReject(qc.clone())));
        }
        steps.push(Box::new(DropColumns {
            time: c.drop_time_column,
            background: c.drop_background_columns,
        }));
        steps.push(Box::new(Normalize {
            start: c.baseline_sampling_start,
            end: c.baseline_sampling_end,
        }));
        if let Some(qc) = &c.qc {
            steps.push(Box::new(CorruptedPeakReject(qc.clone())));
        }
        steps
    }
}

/// Removes acquisition transients at the start of the recording. Frame
/// numbering is preserved: row 0 of the result is frame `n`.
struct DiscardLeadingRows(usize);

impl Step for DiscardLeadingRows {
    fn name(&self) -> &'static str {
        "discard_leading_rows"
    }

    fn apply(&self, table: &mut Table, _warnings: &mut Vec<String>) -> Result<()> {
        table.discard_leading_rows(self.0);
        Ok(())
    }
}

/// Centered moving average over every signal column, reduced window at the
/// edges.
struct Smooth(usize);

impl Step for Smooth {
    fn name(&self) -> &'static str {
        "smooth"
    }

    fn apply(&self, table: &mut Table, _warnings: &mut Vec<String>) -> Result<()> {
        let window = self.0;
        table.map_signal_columns(|_, values| {
            *values = moving_average_centered(values, window);
        });
        Ok(())
    }
}

/// Subtracts the per-row mean of the designated background columns from
/// every column.
struct SubtractBackground;

impl Step for SubtractBackground {
    fn name(&self) -> &'static str {
        "subtract_background"
    }

    fn apply(&self, table: &mut Table, _warnings: &mut Vec<String>) -> Result<()> {
        let level = table.background_level();
        if level.is_empty() {
            return Ok(());
        }
        table.map_all_columns(|_, values| {
            for (v, b) in values.iter_mut().zip(&level) {
                *v -= b;
            }
        });
        Ok(())
    }
}

struct DropColumns {
    time: bool,
    background: bool,
}

impl Step for DropColumns {
    fn name(&self) -> &'static str {
        "drop_columns"
    }

    fn apply(&self, table: &mut Table, _warnings: &mut Vec<String>) -> Result<()> {
        if self.time {
            table.drop_time_column();
        }
        if self.background {
            table.drop_background_columns();
        }
        Ok(())
    }
}

/// Divides every signal column by its F0 mean over the baseline sampling
/// window (row positions of the trimmed table). Baseline level is 1.0 by
/// construction afterwards.
struct Normalize {
    start: usize,
    end: usize,
}

impl Step for Normalize {
    fn name(&self) -> &'static str {
        "normalize"
    }

    fn apply(&self, table: &mut Table, _warnings: &mut Vec<String>) -> Result<()> {
        let (start, end) = (self.start, self.end);
        table.map_signal_columns(|_, values| {
            let hi = end.min(values.len());
            if start >= hi {
                return;
            }
            let f0 = mean(&values[start..hi]);
            if f0 == 0.0 {
                return;
            }
            for v in values.iter_mut() {
                *v /= f0;
            }
        });
        Ok(())
    }
}

/// Replaces samples that exceed the local moving average by more than
/// `factor_threshold` times the mean pre-window peak level. Columns without
/// detectable pre-window peaks are left alone.
struct OvershootCorrect(QcConfig);

impl Step for OvershootCorrect {
    fn name(&self) -> &'static str {
        "overshoot_correct"
    }

    fn apply(&self, table: &mut Table, warnings: &mut Vec<String>) -> Result<()> {
        let qc = &self.0;
        table.map_signal_columns(|name, values| {
            let peaks = leading_local_maxima(values, qc.pre_window);
            if peaks.is_empty() {
                return;
            }
            let base = mean(&peaks);
            let avg = moving_average_centered(values, qc.overshoot_avg_window);
            let mut corrected = 0usize;
            for (v, a) in values.iter_mut().zip(&avg) {
                if *v > a + qc.overshoot_factor_threshold * base {
                    *v = a + qc.overshoot_factor_replacement * base;
                    corrected += 1;
                }
            }
            if corrected > 0 {
                warn!(column = name, corrected, "overshoot correction applied");
                warnings.push(format!(
                    "overshoot correction replaced {} samples in '{}'",
                    corrected, name
                ));
            }
        });
        Ok(())
    }
}

/// Drops columns whose pre-rise segment is noisy relative to the global
/// maximum. Columns without detectable pre-window peaks are never rejected.
struct NoisyPreRiseReject(QcConfig);

impl Step for NoisyPreRiseReject {
    fn name(&self) -> &'static str {
        "noisy_pre_rise_reject"
    }

    fn apply(&self, table: &mut Table, warnings: &mut Vec<String>) -> Result<()> {
        let qc = &self.0;
        let mut rejected = Vec::new();
        for name in table.column_names() {
            if !table.is_signal_column(name) {
                continue;
            }
            let Some(col) = table.column(name) else {
                continue;
            };
            let values = &col.values;
            let peaks = leading_local_maxima(values, qc.pre_window);
            if peaks.is_empty() {
                continue;
            }
            let Some(global_max) = nan_max(values) else {
                continue;
            };
            let peak_mean = mean(&peaks);
            let peak_max = nan_max(&peaks).unwrap_or(0.0);
            if peak_mean * qc.noise_factor_mean > global_max
                || peak_max * qc.noise_factor_peak > global_max
            {
                rejected.push(name.to_string());
            }
        }
        for name in rejected {
            warn!(column = %name, "noisy pre-rise, column rejected");
            warnings.push(format!("column '{}' rejected: noisy pre-rise", name));
            table.drop_column(&name);
        }
        Ok(())
    }
}

/// After normalization, a column whose maximum falls outside the plausible
/// transient window has a corrupted peak; warn and optionally drop it.
struct CorruptedPeakReject(QcConfig);

impl Step for CorruptedPeakReject {
    fn name(&self) -> &'static str {
        "corrupted_peak_reject"
    }

    fn apply(&self, table: &mut Table, warnings: &mut Vec<String>) -> Result<()> {
        let qc = &self.0;
        let first_frame = table.first_frame();
        let mut corrupted = Vec::new();
        for name in table.column_names() {
            if !table.is_signal_column(name) {
                continue;
            }
            let Some(col) = table.column(name) else {
                continue;
            };
            let values = &col.values;
            let mut max_pos = None;
            for (i, v) in values.iter().enumerate() {
                if v.is_nan() {
                    continue;
                }
                match max_pos {
                    Some(p) if values[p as usize] >= *v => {}
                    _ => max_pos = Some(i as i64),
                }
            }
            let Some(pos) = max_pos else { continue };
            let frame = first_frame + pos;
            if frame < qc.earliest_onset_frame || frame > qc.latest_recovery_frame {
                corrupted.push((name.to_string(), frame));
            }
        }
        for (name, frame) in corrupted {
            warn!(column = %name, frame, "corrupted peak outside plausible window");
            warnings.push(format!(
                "column '{}' peaks at frame {}, outside [{}, {}]",
                name, frame, qc.earliest_onset_frame, qc.latest_recovery_frame
            ));
            if qc.drop_corrupted_peaks {
                table.drop_column(&name);
            }
        }
        Ok(())
    }
}
