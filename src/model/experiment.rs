//! The top of the hierarchy: groups keyed by label, lexicographically
//! sorted for deterministic output.

use std::collections::HashMap;

#[cfg(feature = "mt")]
use rayon::prelude::*;

use crate::error::{CalTraceError, Result};
use crate::model::group::Group;
use crate::model::response::Response;
use crate::schema::{FullAnalysisRecord, MetricKind, MetricRecord};

#[derive(Debug, Clone)]
pub struct Experiment {
    pub name: String,
    groups: Vec<Group>,
    label_index: HashMap<String, usize>,
}

impl Experiment {
    /// Builds an experiment from its groups, sorted by label. Errors when
    /// the set is empty or two groups share a label.
    pub fn new(name: impl Into<String>, mut groups: Vec<Group>) -> Result<Self> {
        if groups.is_empty() {
            return Err(CalTraceError::EmptyCollection { what: "experiment" });
        }
        groups.sort_by(|a, b| a.group_label.cmp(&b.group_label));
        for pair in groups.windows(2) {
            if pair[0].group_label == pair[1].group_label {
                return Err(CalTraceError::InconsistentMembership {
                    what: "unique group label",
                    expected: format!("one group labeled '{}'", pair[0].group_label),
                    found: "duplicate".to_string(),
                });
            }
        }
        let label_index = groups
            .iter()
            .enumerate()
            .map(|(i, g)| (g.group_label.clone(), i))
            .collect();
        Ok(Self {
            name: name.into(),
            groups,
            label_index,
        })
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Group> {
        self.groups.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Group> {
        self.groups.iter_mut()
    }

    pub fn get(&self, group_label: &str) -> Option<&Group> {
        self.label_index.get(group_label).map(|&i| &self.groups[i])
    }

    pub fn iter_responses(&self) -> impl Iterator<Item = &Response> {
        self.groups.iter().flat_map(|g| g.iter_responses())
    }

    pub fn num_responses(&self) -> usize {
        self.iter_responses().count()
    }

    /// Aligns onsets within each group.
    pub fn align_onsets(&mut self) {
        for group in &mut self.groups {
            group.align_onsets();
        }
    }

    /// Flattened records for one metric across the whole hierarchy, in
    /// (group label, sample id, response id) order. Per-response failures
    /// become missing values; their warnings are returned alongside the
    /// records in the same member order.
    pub fn collect_metric(&self, kind: MetricKind) -> (Vec<MetricRecord>, Vec<String>) {
        let per_response = map_responses(&self.flat_responses(), |r, warnings| MetricRecord {
            group_label: r.group_label.clone(),
            sample_id: r.sample_id,
            response_id: r.response_id,
            value: r.metric(kind, warnings),
        });
        merge(per_response)
    }

    pub fn calculate_eflux_rates(&self) -> (Vec<MetricRecord>, Vec<String>) {
        self.collect_metric(MetricKind::Eflux)
    }

    pub fn calculate_influx_rates(&self) -> (Vec<MetricRecord>, Vec<String>) {
        self.collect_metric(MetricKind::Influx)
    }

    pub fn calculate_amplitudes(&self) -> (Vec<MetricRecord>, Vec<String>) {
        self.collect_metric(MetricKind::Amplitude)
    }

    pub fn calculate_integrals(&self) -> (Vec<MetricRecord>, Vec<String>) {
        self.collect_metric(MetricKind::Integral)
    }

    pub fn calculate_taus(&self) -> (Vec<MetricRecord>, Vec<String>) {
        self.collect_metric(MetricKind::Tau)
    }

    /// All five metrics plus landmark frames for every response.
    pub fn full_analysis(&self) -> (Vec<FullAnalysisRecord>, Vec<String>) {
        let per_response = map_responses(&self.flat_responses(), |r, warnings| {
            let indices = r.indices();
            FullAnalysisRecord {
                group_label: r.group_label.clone(),
                sample_id: r.sample_id,
                response_id: r.response_id,
                onset_frame: indices.onset_idx,
                peak_frame: indices.peak_idx,
                eflux: r.metric(MetricKind::Eflux, warnings),
                influx: r.metric(MetricKind::Influx, warnings),
                amplitude: r.metric(MetricKind::Amplitude, warnings),
                integral: r.metric(MetricKind::Integral, warnings),
                tau: r.metric(MetricKind::Tau, warnings),
            }
        });
        merge(per_response)
    }

    fn flat_responses(&self) -> Vec<&Response> {
        self.iter_responses().collect()
    }
}

/// Applies `f` to every response, collecting one warning buffer per response
/// so parallel workers never interleave on shared state. Output order
/// follows member order either way.
fn map_responses<T: Send>(
    responses: &[&Response],
    f: impl Fn(&Response, &mut Vec<String>) -> T + Sync,
) -> Vec<(T, Vec<String>)> {
    #[cfg(feature = "mt")]
    {
        responses
            .par_iter()
            .map(|r| {
                let mut warnings = Vec::new();
                let out = f(r, &mut warnings);
                (out, warnings)
            })
            .collect()
    }
    #[cfg(not(feature = "mt"))]
    {
        responses
            .iter()
            .map(|r| {
                let mut warnings = Vec::new();
                let out = f(r, &mut warnings);
                (out, warnings)
            })
            .collect()
    }
}

fn merge<T>(per_response: Vec<(T, Vec<String>)>) -> (Vec<T>, Vec<String>) {
    let mut records = Vec::with_capacity(per_response.len());
    let mut warnings = Vec::new();
    for (record, mut w) in per_response {
        records.push(record);
        warnings.append(&mut w);
    }
    (records, warnings)
}
