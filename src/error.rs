use thiserror::Error;

/// Errors surfaced by the trace analysis core.
///
/// `InvalidWindow` is recoverable at batch granularity: aggregation catches it
/// per response and records a missing value instead of aborting. The
/// membership errors indicate caller logic bugs and are always fatal at
/// construction.
#[derive(Debug, Error)]
pub enum CalTraceError {
    #[error("invalid window for {what}: end {end} <= start {start}")]
    InvalidWindow {
        what: &'static str,
        start: i64,
        end: i64,
    },

    #[error("inconsistent membership for {what}: expected '{expected}', found '{found}'")]
    InconsistentMembership {
        what: &'static str,
        expected: String,
        found: String,
    },

    #[error("cannot construct {what} from zero members")]
    EmptyCollection { what: &'static str },
}

pub type Result<T> = std::result::Result<T, CalTraceError>;
