//! The aggregation hierarchy: Experiment → Group → Sample → Response.
//!
//! Ownership is strictly tree-shaped; lookup maps are derived, never owned.
//! Construction order is bottom-up: responses run feature detection when
//! built, then group into samples by shared sample id, samples into groups
//! by shared label, groups into an experiment sorted by label.

pub mod experiment;
pub mod group;
pub mod response;
pub mod sample;

pub use experiment::Experiment;
pub use group::Group;
pub use response::Response;
pub use sample::Sample;
