//! A physical specimen (coverslip) owning an ordered set of responses.

use std::collections::HashMap;

use crate::error::{CalTraceError, Result};
use crate::model::response::Response;
use crate::schema::{MetricKind, MetricRecord};

#[derive(Debug, Clone)]
pub struct Sample {
    pub sample_id: u32,
    pub group_label: String,
    responses: Vec<Response>,
    id_index: HashMap<u32, usize>,
}

impl Sample {
    /// Builds a sample from its responses, sorted by response id. Errors
    /// when the set is empty or the members disagree on sample id or group
    /// label.
    pub fn new(mut responses: Vec<Response>) -> Result<Self> {
        let first = responses
            .first()
            .ok_or(CalTraceError::EmptyCollection { what: "sample" })?;
        let sample_id = first.sample_id;
        let group_label = first.group_label.clone();
        for r in &responses {
            if r.sample_id != sample_id {
                return Err(CalTraceError::InconsistentMembership {
                    what: "sample id",
                    expected: sample_id.to_string(),
                    found: r.sample_id.to_string(),
                });
            }
            if r.group_label != group_label {
                return Err(CalTraceError::InconsistentMembership {
                    what: "group label",
                    expected: group_label.clone(),
                    found: r.group_label.clone(),
                });
            }
        }
        responses.sort_by_key(|r| r.response_id);
        let id_index = Self::build_index(&responses);
        Ok(Self {
            sample_id,
            group_label,
            responses,
            id_index,
        })
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Response> {
        self.responses.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Response> {
        self.responses.iter_mut()
    }

    pub fn get(&self, response_id: u32) -> Option<&Response> {
        self.id_index.get(&response_id).map(|&i| &self.responses[i])
    }

    pub fn get_mut(&mut self, response_id: u32) -> Option<&mut Response> {
        let i = *self.id_index.get(&response_id)?;
        Some(&mut self.responses[i])
    }

    /// Removes one response by id; `Ok(None)` when the id is unknown. Errors
    /// rather than leaving the sample empty.
    pub fn remove(&mut self, response_id: u32) -> Result<Option<Response>> {
        let Some(&pos) = self.id_index.get(&response_id) else {
            return Ok(None);
        };
        if self.responses.len() == 1 {
            return Err(CalTraceError::EmptyCollection { what: "sample" });
        }
        let removed = self.responses.remove(pos);
        self.id_index = Self::build_index(&self.responses);
        Ok(Some(removed))
    }

    /// One record per response for the given metric, in response-id order.
    pub fn collect_metric(&self, kind: MetricKind, warnings: &mut Vec<String>) -> Vec<MetricRecord> {
        self.responses
            .iter()
            .map(|r| MetricRecord {
                group_label: r.group_label.clone(),
                sample_id: r.sample_id,
                response_id: r.response_id,
                value: r.metric(kind, warnings),
            })
            .collect()
    }

    fn build_index(responses: &[Response]) -> HashMap<u32, usize> {
        responses
            .iter()
            .enumerate()
            .map(|(i, r)| (r.response_id, i))
            .collect()
    }
}
