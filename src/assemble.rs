//! Assembly of the hierarchy from preprocessed tables.
//!
//! One raw table per sample: the file stem names the sample, the signal
//! columns name its responses. Samples sharing a group label fold into
//! groups, groups into an experiment.

use std::collections::BTreeMap;

use tracing::warn;

use crate::config::DetectionConfig;
use crate::error::{CalTraceError, Result};
use crate::model::{Experiment, Group, Response, Sample};
use crate::naming::NamingScheme;
use crate::preprocess::Preprocessor;
use crate::table::Table;

/// Preprocesses one sample's raw table and builds its responses. Columns the
/// naming scheme does not recognize are skipped with a warning. Returned
/// warnings cover preprocessing QC, skipped columns and detection fallbacks.
pub fn build_sample(
    stem: &str,
    raw: &Table,
    naming: &dyn NamingScheme,
    preprocessor: &Preprocessor,
    detection: &DetectionConfig,
) -> Result<(Sample, Vec<String>)> {
    let info = naming
        .parse_sample(stem)
        .ok_or_else(|| CalTraceError::InconsistentMembership {
            what: "sample filename stem",
            expected: "'<sample_id> - <group_label>'".to_string(),
            found: stem.to_string(),
        })?;

    let (processed, mut warnings) = preprocessor.run(raw)?;

    let mut responses = Vec::new();
    for (column, trace) in processed.into_traces() {
        let Some(response_id) = naming.parse_response(&column) else {
            warn!(column = %column, stem, "unrecognized response column skipped");
            warnings.push(format!("column '{}' skipped: not a response column", column));
            continue;
        };
        let response = Response::new(
            response_id,
            info.sample_id,
            info.group_label.clone(),
            trace,
            detection.clone(),
        )?;
        warnings.extend(response.warnings().iter().cloned());
        responses.push(response);
    }

    let sample = Sample::new(responses)?;
    Ok((sample, warnings))
}

/// Folds samples into label-keyed groups and the groups into an experiment.
pub fn build_experiment(name: impl Into<String>, samples: Vec<Sample>) -> Result<Experiment> {
    let mut by_label: BTreeMap<String, Vec<Sample>> = BTreeMap::new();
    for sample in samples {
        by_label
            .entry(sample.group_label.clone())
            .or_default()
            .push(sample);
    }
    let groups = by_label
        .into_values()
        .map(Group::new)
        .collect::<Result<Vec<_>>>()?;
    Experiment::new(name, groups)
}
