//! Numeric primitives over raw sample slices.
//!
//! NaN samples are skipped by the mean/peak helpers so that a column of
//! missing values passes through the QC rules unchanged.

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator); 0.0 for fewer than two
/// samples.
pub fn std(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    (ss / (n - 1) as f64).sqrt()
}

/// Absolute sample-to-sample deltas; one element shorter than the input.
pub fn abs_deltas(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| (w[1] - w[0]).abs()).collect()
}

/// Centered moving average with a reduced window at the edges, so every
/// output sample is defined. For an even window the extra sample is taken on
/// the right.
pub fn moving_average_centered(values: &[f64], window: usize) -> Vec<f64> {
    if window <= 1 || values.is_empty() {
        return values.to_vec();
    }
    let left = (window - 1) / 2;
    let right = window / 2;
    let n = values.len();
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let lo = i.saturating_sub(left);
        let hi = (i + right).min(n - 1);
        out.push(mean(&values[lo..=hi]));
    }
    out
}

/// Trapezoidal-rule integral of `y` against the axis `x`.
///
/// Both slices must have the same length; fewer than two points integrate to
/// 0.0.
pub fn trapezoid(y: &[f64], x: &[f64]) -> f64 {
    debug_assert_eq!(y.len(), x.len());
    let mut acc = 0.0;
    for i in 1..y.len().min(x.len()) {
        acc += 0.5 * (y[i] + y[i - 1]) * (x[i] - x[i - 1]);
    }
    acc
}

/// Values of local maxima within the first `pre_window` samples. A sample is
/// a local maximum when strictly greater than both direct neighbors; NaN
/// samples never qualify.
pub fn leading_local_maxima(values: &[f64], pre_window: usize) -> Vec<f64> {
    let limit = pre_window.min(values.len());
    let mut peaks = Vec::new();
    for i in 1..limit.saturating_sub(1) {
        let v = values[i];
        if v.is_nan() {
            continue;
        }
        if v > values[i - 1] && v > values[i + 1] {
            peaks.push(v);
        }
    }
    peaks
}

/// Maximum over the slice, ignoring NaN; `None` when no finite sample exists.
pub fn nan_max(values: &[f64]) -> Option<f64> {
    values
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .fold(None, |acc, v| Some(acc.map_or(v, |a: f64| a.max(v))))
}
