//! An experimental condition grouping samples that share one label.

use std::collections::HashMap;

use crate::error::{CalTraceError, Result};
use crate::model::response::Response;
use crate::model::sample::Sample;
use crate::schema::{MetricKind, MetricRecord};
use crate::trace::Trace;

#[derive(Debug, Clone)]
pub struct Group {
    pub group_label: String,
    samples: Vec<Sample>,
    id_index: HashMap<u32, usize>,
}

impl Group {
    /// Builds a group from its samples, sorted by sample id. Errors when the
    /// set is empty or a member carries a different group label.
    pub fn new(mut samples: Vec<Sample>) -> Result<Self> {
        let first = samples
            .first()
            .ok_or(CalTraceError::EmptyCollection { what: "group" })?;
        let group_label = first.group_label.clone();
        for s in &samples {
            if s.group_label != group_label {
                return Err(CalTraceError::InconsistentMembership {
                    what: "group label",
                    expected: group_label.clone(),
                    found: s.group_label.clone(),
                });
            }
        }
        samples.sort_by_key(|s| s.sample_id);
        let id_index = samples
            .iter()
            .enumerate()
            .map(|(i, s)| (s.sample_id, i))
            .collect();
        Ok(Self {
            group_label,
            samples,
            id_index,
        })
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Sample> {
        self.samples.iter_mut()
    }

    pub fn get(&self, sample_id: u32) -> Option<&Sample> {
        self.id_index.get(&sample_id).map(|&i| &self.samples[i])
    }

    pub fn iter_responses(&self) -> impl Iterator<Item = &Response> {
        self.samples.iter().flat_map(|s| s.iter())
    }

    /// Flattened records for one metric across all member samples.
    pub fn collect_metric(&self, kind: MetricKind, warnings: &mut Vec<String>) -> Vec<MetricRecord> {
        self.samples
            .iter()
            .flat_map(|s| s.collect_metric(kind, warnings))
            .collect()
    }

    /// Shifts every response so all onsets coincide with the group's
    /// earliest onset, enabling element-wise trace averaging.
    pub fn align_onsets(&mut self) {
        let Some(target) = self
            .iter_responses()
            .map(|r| r.indices().onset_idx)
            .min()
        else {
            return;
        };
        for sample in &mut self.samples {
            for response in sample.iter_mut() {
                let k = target - response.indices().onset_idx;
                if k != 0 {
                    response.shift(k);
                }
            }
        }
    }

    /// Element-wise mean of the member traces over their common frame range.
    pub fn mean_trace(&self) -> Result<Trace> {
        let start = self
            .iter_responses()
            .map(|r| r.trace().first_frame())
            .max()
            .ok_or(CalTraceError::EmptyCollection { what: "group" })?;
        let end = self
            .iter_responses()
            .map(|r| r.trace().last_frame())
            .min()
            .ok_or(CalTraceError::EmptyCollection { what: "group" })?;
        if end <= start {
            return Err(CalTraceError::InvalidWindow {
                what: "mean trace overlap",
                start,
                end,
            });
        }
        let n = (end - start + 1) as usize;
        let mut sums = vec![0.0; n];
        let mut count = 0usize;
        for r in self.iter_responses() {
            for (i, s) in sums.iter_mut().enumerate() {
                if let Some(v) = r.trace().value_at(start + i as i64) {
                    *s += v;
                }
            }
            count += 1;
        }
        for s in &mut sums {
            *s /= count as f64;
        }
        Ok(Trace::new(start, sums))
    }
}
