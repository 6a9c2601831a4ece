//! Output record schema consumed by export and visualization collaborators.
//!
//! Every record carries its full lineage (group label, sample id, response
//! id). Missing metric values are `None`, the documented sentinel produced
//! when a per-response computation fails on a degenerate window; records are
//! never omitted, so downstream tables stay rectangular.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Eflux,
    Influx,
    Amplitude,
    Integral,
    Tau,
}

/// One metric value for one response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricRecord {
    pub group_label: String,
    pub sample_id: u32,
    pub response_id: u32,
    pub value: Option<f64>,
}

/// All metrics plus the detected landmark frames for one response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullAnalysisRecord {
    pub group_label: String,
    pub sample_id: u32,
    pub response_id: u32,
    pub onset_frame: i64,
    pub peak_frame: i64,
    pub eflux: Option<f64>,
    pub influx: Option<f64>,
    pub amplitude: Option<f64>,
    pub integral: Option<f64>,
    pub tau: Option<f64>,
}
