//! The in-memory table boundary type.
//!
//! Collaborators that parse spreadsheets fill a [`Table`]; the core never
//! touches files. Columns are equal-length numeric series; one column may be
//! designated as the acquisition time axis and any subset as background
//! fluorescence references.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{CalTraceError, Result};
use crate::trace::Trace;

static COLUMN_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<f64>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Table {
    columns: Vec<Column>,
    time_column: Option<String>,
    background_columns: Vec<String>,
    /// Untrimmed copy of the time column, kept so traces retain a time axis
    /// even when the column itself is dropped or background-subtracted.
    time_axis: Option<Vec<f64>>,
    /// Frame number of the first row; advances as leading rows are trimmed.
    first_frame: i64,
}

impl Table {
    /// Builds a table, validating that every column has the same length and
    /// that the designated time/background columns exist.
    pub fn new(
        columns: Vec<Column>,
        time_column: Option<&str>,
        background_columns: &[&str],
    ) -> Result<Self> {
        if columns.is_empty() {
            return Err(CalTraceError::EmptyCollection { what: "table" });
        }
        let n_rows = columns[0].values.len();
        for col in &columns {
            if col.values.len() != n_rows {
                return Err(CalTraceError::InconsistentMembership {
                    what: "table column length",
                    expected: n_rows.to_string(),
                    found: format!("{} ({})", col.values.len(), col.name),
                });
            }
        }
        for name in background_columns
            .iter()
            .copied()
            .chain(time_column)
        {
            if !columns.iter().any(|c| c.name == name) {
                return Err(CalTraceError::InconsistentMembership {
                    what: "designated column",
                    expected: name.to_string(),
                    found: "absent".to_string(),
                });
            }
        }
        let time_axis =
            time_column.and_then(|t| columns.iter().find(|c| c.name == t).map(|c| c.values.clone()));
        Ok(Self {
            columns,
            time_column: time_column.map(str::to_string),
            background_columns: background_columns.iter().map(|s| s.to_string()).collect(),
            time_axis,
            first_frame: 0,
        })
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn first_frame(&self) -> i64 {
        self.first_frame
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn time_column(&self) -> Option<&str> {
        self.time_column.as_deref()
    }

    pub fn background_columns(&self) -> &[String] {
        &self.background_columns
    }

    pub fn is_signal_column(&self, name: &str) -> bool {
        self.time_column.as_deref() != Some(name)
            && !self.background_columns.iter().any(|b| b == name)
    }

    /// Reorders columns: time column first, the rest ascending by the first
    /// integer embedded in their name (name order for ties / no number).
    pub fn sort_columns(&mut self) {
        let time_col = self.time_column.clone();
        self.columns.sort_by(|a, b| {
            let a_time = time_col.as_deref() == Some(a.name.as_str());
            let b_time = time_col.as_deref() == Some(b.name.as_str());
            b_time
                .cmp(&a_time)
                .then_with(|| column_sort_key(&a.name).cmp(&column_sort_key(&b.name)))
                .then_with(|| a.name.cmp(&b.name))
        });
    }

    /// Signal columns as baseline-relative traces, each carrying the time
    /// axis when one was designated.
    pub fn into_traces(self) -> Vec<(String, Trace)> {
        let time_axis = self.time_axis;
        let first_frame = self.first_frame;
        let time_col = self.time_column;
        let backgrounds = self.background_columns;
        self.columns
            .into_iter()
            .filter(|c| {
                time_col.as_deref() != Some(c.name.as_str())
                    && !backgrounds.iter().any(|b| b == &c.name)
            })
            .map(|c| {
                let trace = match &time_axis {
                    Some(t) if t.len() == c.values.len() => {
                        Trace::with_time(first_frame, c.values, t.clone())
                    }
                    _ => Trace::new(first_frame, c.values),
                };
                (c.name, trace)
            })
            .collect()
    }

    // Mutators below are internal to the preprocessing pipeline.

    pub(crate) fn discard_leading_rows(&mut self, n: usize) {
        let n = n.min(self.n_rows());
        for col in &mut self.columns {
            col.values.drain(..n);
        }
        if let Some(t) = &mut self.time_axis {
            t.drain(..n.min(t.len()));
        }
        self.first_frame += n as i64;
    }

    pub(crate) fn map_signal_columns(&mut self, mut f: impl FnMut(&str, &mut Vec<f64>)) {
        let time_col = self.time_column.clone();
        for col in &mut self.columns {
            if time_col.as_deref() != Some(col.name.as_str()) {
                let name = col.name.clone();
                f(&name, &mut col.values);
            }
        }
    }

    pub(crate) fn map_all_columns(&mut self, mut f: impl FnMut(&str, &mut Vec<f64>)) {
        for col in &mut self.columns {
            let name = col.name.clone();
            f(&name, &mut col.values);
        }
    }

    pub(crate) fn drop_column(&mut self, name: &str) {
        self.columns.retain(|c| c.name != name);
    }

    pub(crate) fn drop_time_column(&mut self) {
        if let Some(t) = self.time_column.clone() {
            self.drop_column(&t);
        }
    }

    pub(crate) fn drop_background_columns(&mut self) {
        let backgrounds = self.background_columns.clone();
        for b in &backgrounds {
            self.drop_column(b);
        }
    }

    /// Per-row mean across the designated background columns; empty when no
    /// background columns are designated.
    pub(crate) fn background_level(&self) -> Vec<f64> {
        if self.background_columns.is_empty() {
            return Vec::new();
        }
        let n = self.n_rows();
        let mut sums = vec![0.0; n];
        let mut count = 0usize;
        for b in &self.background_columns {
            if let Some(col) = self.column(b) {
                for (s, v) in sums.iter_mut().zip(&col.values) {
                    *s += v;
                }
                count += 1;
            }
        }
        if count == 0 {
            return Vec::new();
        }
        for s in &mut sums {
            *s /= count as f64;
        }
        sums
    }
}

fn column_sort_key(name: &str) -> u64 {
    COLUMN_NUMBER
        .find(name)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(u64::MAX)
}
