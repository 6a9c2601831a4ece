//! Ordinary least-squares line fit over a trace window.

use crate::error::{CalTraceError, Result};
use crate::trace::Trace;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    pub fn predict(&self, frame: i64) -> f64 {
        self.intercept + self.slope * frame as f64
    }
}

/// Least-squares line through the trace samples in the inclusive window
/// `[start_frame, end_frame]`.
///
/// The independent variable is the frame number itself, not the position
/// within the window, so fits stay comparable across trimmed and shifted
/// traces. Errors with `InvalidWindow` when `end <= start` or fewer than two
/// samples fall inside the trace.
pub fn linear_fit(trace: &Trace, start_frame: i64, end_frame: i64) -> Result<LinearFit> {
    let points = trace.window(start_frame, end_frame, "linear fit")?;
    if points.len() < 2 {
        return Err(CalTraceError::InvalidWindow {
            what: "linear fit",
            start: start_frame,
            end: end_frame,
        });
    }

    let n = points.len() as f64;
    let mut sx = 0.0;
    let mut sy = 0.0;
    for &(frame, v) in &points {
        sx += frame as f64;
        sy += v;
    }
    let mx = sx / n;
    let my = sy / n;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for &(frame, v) in &points {
        let dx = frame as f64 - mx;
        sxx += dx * dx;
        sxy += dx * (v - my);
    }

    let slope = sxy / sxx;
    Ok(LinearFit {
        slope,
        intercept: my - slope * mx,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_line_recovered() {
        let values: Vec<f64> = (0..20).map(|i| 0.5 * i as f64 + 2.0).collect();
        let trace = Trace::new(0, values);
        let fit = linear_fit(&trace, 0, 19).unwrap();
        assert!((fit.slope - 0.5).abs() < 1e-12);
        assert!((fit.intercept - 2.0).abs() < 1e-12);
    }

    #[test]
    fn x_axis_is_the_frame_number() {
        // Same samples, trace shifted to start at frame 100: the intercept
        // must account for the absolute frame values.
        let values: Vec<f64> = (100..120).map(|i| 0.5 * i as f64 + 2.0).collect();
        let trace = Trace::new(100, values);
        let fit = linear_fit(&trace, 100, 119).unwrap();
        assert!((fit.slope - 0.5).abs() < 1e-12);
        assert!((fit.intercept - 2.0).abs() < 1e-12);
        assert!((fit.predict(110) - 57.0).abs() < 1e-12);
    }

    #[test]
    fn degenerate_window_is_invalid() {
        let trace = Trace::new(0, vec![1.0, 2.0, 3.0]);
        let err = linear_fit(&trace, 2, 2).unwrap_err();
        assert!(matches!(err, CalTraceError::InvalidWindow { .. }));
    }
}
