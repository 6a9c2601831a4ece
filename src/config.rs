//! Tuning knobs for preprocessing and feature detection.
//!
//! All values are empirically tuned defaults, not fixed requirements. Frame
//! numbers refer to the trace's own index, which no longer starts at 0 after
//! the leading rows are discarded.

/// Preprocessing pipeline options.
#[derive(Debug, Clone)]
pub struct PreprocessConfig {
    pub first_n_points_to_discard: usize,
    pub smoothing_window_size: usize,
    /// F0 sampling window, `[start, end)` in rows of the trimmed table.
    pub baseline_sampling_start: usize,
    pub baseline_sampling_end: usize,
    pub drop_time_column: bool,
    pub drop_background_columns: bool,
    /// Corrupted-trace rejection rules; `None` disables them.
    pub qc: Option<QcConfig>,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            first_n_points_to_discard: 5,
            smoothing_window_size: 2,
            baseline_sampling_start: 1,
            baseline_sampling_end: 35,
            drop_time_column: true,
            drop_background_columns: true,
            qc: None,
        }
    }
}

/// Quality-control rules for corrupted traces.
///
/// "Pre-window peaks" are local maxima found within the first `pre_window`
/// samples of a column; columns with no detectable pre-window peaks are never
/// corrected or rejected by the overshoot and noise rules.
#[derive(Debug, Clone)]
pub struct QcConfig {
    pub pre_window: usize,
    pub overshoot_avg_window: usize,
    pub overshoot_factor_threshold: f64,
    pub overshoot_factor_replacement: f64,
    pub noise_factor_mean: f64,
    pub noise_factor_peak: f64,
    /// A normalized column whose maximum falls outside
    /// `[earliest_onset_frame, latest_recovery_frame]` has a corrupted peak.
    pub earliest_onset_frame: i64,
    pub latest_recovery_frame: i64,
    pub drop_corrupted_peaks: bool,
}

impl Default for QcConfig {
    fn default() -> Self {
        Self {
            pre_window: 35,
            overshoot_avg_window: 10,
            overshoot_factor_threshold: 2.0,
            overshoot_factor_replacement: 1.0,
            noise_factor_mean: 2.0,
            noise_factor_peak: 1.5,
            earliest_onset_frame: 40,
            latest_recovery_frame: 120,
            drop_corrupted_peaks: true,
        }
    }
}

/// Feature-detection bounds and offsets.
#[derive(Debug, Clone)]
pub struct DetectionConfig {
    /// Onset search bounds, inclusive start / exclusive end.
    pub min_onset: i64,
    pub max_onset: i64,
    /// Number of frames preceding the search start used to estimate baseline
    /// fluctuation.
    pub baseline_window: i64,
    pub onset_z_threshold: f64,
    pub peak_threshold_factor: f64,
    pub peak_sliding_window: i64,
    pub peak_search_ceiling: i64,
    pub influx_end_offset_from_peak: i64,
    pub eflux_start_offset_from_peak: i64,
    pub eflux_end_max_offset_from_start: i64,
    pub eflux_end_min_offset_from_start: i64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_onset: 40,
            max_onset: 80,
            baseline_window: 30,
            onset_z_threshold: 3.0,
            peak_threshold_factor: 3.0,
            peak_sliding_window: 3,
            peak_search_ceiling: 120,
            influx_end_offset_from_peak: 1,
            eflux_start_offset_from_peak: 5,
            eflux_end_max_offset_from_start: 30,
            eflux_end_min_offset_from_start: 3,
        }
    }
}
