//! A single response's fluorescence time series.

use crate::error::{CalTraceError, Result};

/// Ordered fluorescence samples indexed by integer frame number.
///
/// The first frame is not necessarily 0: discarding leading rows during
/// preprocessing keeps the original frame numbering, so detection windows and
/// regression x-values speak the same frame language before and after
/// trimming. Values are relative to the F0 baseline, which sits at 1.0 after
/// normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    first_frame: i64,
    values: Vec<f64>,
    time: Option<Vec<f64>>,
}

impl Trace {
    pub fn new(first_frame: i64, values: Vec<f64>) -> Self {
        Self {
            first_frame,
            values,
            time: None,
        }
    }

    /// Attaches a time axis (one entry per sample, in acquisition time
    /// units). Integral and tau computations use it when present.
    ///
    /// Panics when the axis length does not match the sample count; the
    /// axis always originates from the same table as the samples.
    pub fn with_time(first_frame: i64, values: Vec<f64>, time: Vec<f64>) -> Self {
        assert_eq!(values.len(), time.len(), "time axis length mismatch");
        Self {
            first_frame,
            values,
            time: Some(time),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn first_frame(&self) -> i64 {
        self.first_frame
    }

    pub fn last_frame(&self) -> i64 {
        self.first_frame + self.values.len() as i64 - 1
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn has_time_axis(&self) -> bool {
        self.time.is_some()
    }

    pub fn value_at(&self, frame: i64) -> Option<f64> {
        self.position(frame).map(|p| self.values[p])
    }

    /// Elapsed-time coordinate of a frame: the attached time axis when
    /// present, the frame number itself otherwise.
    pub fn time_at(&self, frame: i64) -> Option<f64> {
        let pos = self.position(frame)?;
        match &self.time {
            Some(t) => Some(t[pos]),
            None => Some(frame as f64),
        }
    }

    /// Inclusive frame window as `(frame, value)` pairs, clamped to the
    /// trace. Errors when the window is degenerate before clamping.
    pub fn window(&self, start: i64, end: i64, what: &'static str) -> Result<Vec<(i64, f64)>> {
        if end <= start {
            return Err(CalTraceError::InvalidWindow { what, start, end });
        }
        let lo = start.max(self.first_frame);
        let hi = end.min(self.last_frame());
        let mut out = Vec::new();
        let mut frame = lo;
        while frame <= hi {
            if let Some(v) = self.value_at(frame) {
                out.push((frame, v));
            }
            frame += 1;
        }
        Ok(out)
    }

    /// Frame of the maximum value within `[start, end]` (clamped); ties
    /// resolve to the earliest frame.
    pub fn max_frame_in(&self, start: i64, end: i64) -> Option<i64> {
        let lo = start.max(self.first_frame);
        let hi = end.min(self.last_frame());
        let mut best: Option<(i64, f64)> = None;
        let mut frame = lo;
        while frame <= hi {
            let v = self.value_at(frame)?;
            match best {
                Some((_, bv)) if bv >= v => {}
                _ => best = Some((frame, v)),
            }
            frame += 1;
        }
        best.map(|(f, _)| f)
    }

    /// Translates the trace by `k` frames. Samples and the time axis are
    /// untouched; only the frame numbering moves.
    pub fn shift(&mut self, k: i64) {
        self.first_frame += k;
    }

    fn position(&self, frame: i64) -> Option<usize> {
        if frame < self.first_frame {
            return None;
        }
        let pos = (frame - self.first_frame) as usize;
        if pos < self.values.len() {
            Some(pos)
        } else {
            None
        }
    }
}
