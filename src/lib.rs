//! kira-caltrace: kinetic feature extraction for per-cell calcium
//! fluorescence traces.
//!
//! The core takes baseline-normalized traces (or raw tables run through the
//! [`preprocess::Preprocessor`]), detects onset / peak / rate windows per
//! response, computes kinetic metrics (amplitude, influx and eflux rates,
//! integral, tau) and aggregates them across the Experiment → Group →
//! Sample → Response hierarchy into labeled record batches.
//!
//! File parsing, plotting and export live in surrounding collaborators; the
//! boundary types are [`table::Table`] on the way in and the [`schema`]
//! records on the way out.

pub mod assemble;
pub mod config;
pub mod detect;
pub mod error;
pub mod math;
pub mod model;
pub mod naming;
pub mod preprocess;
pub mod schema;
pub mod table;
pub mod trace;

pub use config::{DetectionConfig, PreprocessConfig, QcConfig};
pub use error::{CalTraceError, Result};
pub use model::{Experiment, Group, Response, Sample};
pub use trace::Trace;
