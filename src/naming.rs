//! Filename and column naming conventions.
//!
//! Acquisition software encodes identity in names: the file stem carries the
//! sample id and group label, columns carry the response (ROI) id. Two
//! schemes are in circulation; both sit behind [`NamingScheme`] so the rest
//! of the core never parses strings.

use std::sync::LazyLock;

use regex::Regex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleInfo {
    pub sample_id: u32,
    pub group_label: String,
}

pub trait NamingScheme {
    /// Parses a file stem into sample id and group label.
    fn parse_sample(&self, stem: &str) -> Option<SampleInfo>;

    /// Parses a column name into a response id; `None` for non-response
    /// columns (time, background, unrelated).
    fn parse_response(&self, column: &str) -> Option<u32>;
}

/// Current convention: `"<sample_id> - <group_label>"` stems and
/// `"ROI <n> (Average)"` columns.
#[derive(Debug, Default, Clone, Copy)]
pub struct CurrentNaming;

static CURRENT_STEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?P<sample_id>\d+)\s*-\s*(?P<group_label>.+?)\s*$").unwrap());
static CURRENT_COLUMN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ROI\s*(\d+)\s*\(Average\)$").unwrap());

impl NamingScheme for CurrentNaming {
    fn parse_sample(&self, stem: &str) -> Option<SampleInfo> {
        let caps = CURRENT_STEM.captures(stem)?;
        Some(SampleInfo {
            sample_id: caps["sample_id"].parse().ok()?,
            group_label: caps["group_label"].to_string(),
        })
    }

    fn parse_response(&self, column: &str) -> Option<u32> {
        let caps = CURRENT_COLUMN.captures(column)?;
        caps.get(1)?.as_str().parse().ok()
    }
}

/// Legacy convention: columns already renamed to `"cs-<id>_roi-<n>"`
/// (lowercase), stems as in the current scheme.
#[derive(Debug, Default, Clone, Copy)]
pub struct LegacyNaming;

static LEGACY_COLUMN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^cs-(?P<sample_id>\d+)_roi-(?P<roi_id>\d+)$").unwrap());

impl NamingScheme for LegacyNaming {
    fn parse_sample(&self, stem: &str) -> Option<SampleInfo> {
        CurrentNaming.parse_sample(stem)
    }

    fn parse_response(&self, column: &str) -> Option<u32> {
        let caps = LEGACY_COLUMN.captures(column)?;
        caps["roi_id"].parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_stem_parses_with_whitespace() {
        let info = CurrentNaming.parse_sample(" 12 - shNCLX ").unwrap();
        assert_eq!(info.sample_id, 12);
        assert_eq!(info.group_label, "shNCLX");
    }

    #[test]
    fn current_column_parses_roi_id() {
        assert_eq!(CurrentNaming.parse_response("ROI 7 (Average)"), Some(7));
        assert_eq!(CurrentNaming.parse_response("ROI7(Average)"), Some(7));
        assert_eq!(CurrentNaming.parse_response("Time"), None);
    }

    #[test]
    fn legacy_column_parses_roi_id() {
        assert_eq!(LegacyNaming.parse_response("cs-3_roi-14"), Some(14));
        assert_eq!(LegacyNaming.parse_response("ROI 14 (Average)"), None);
    }

    #[test]
    fn malformed_stem_rejected() {
        assert!(CurrentNaming.parse_sample("no id here").is_none());
    }
}
