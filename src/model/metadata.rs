//! Document metadata shared by all input formats.
//!
//! HWP 5.0 fills this from the summary property set and HWPX from the OPF
//! package metadata. HWP 3.x only reports its format version.

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Metadata {
    /// Document title
    pub title: Option<String>,
    /// Document author/creator
    pub author: Option<String>,
    /// Document subject or description
    pub subject: Option<String>,
    /// Keywords, split on commas and semicolons
    pub keywords: Vec<String>,
    /// Creation date
    pub created: Option<DateTime<Utc>>,
    /// Last modification date
    pub modified: Option<DateTime<Utc>>,
    /// Application that wrote the document
    pub creator_app: Option<String>,
    /// Format version as written in the file, e.g. `5.1.0.1`
    pub format_version: Option<String>,
    /// Document was saved in distribution (copy-protected) mode
    pub is_distribution: bool,
}

impl Metadata {
    /// Check if the metadata contains any descriptive data.
    pub fn has_data(&self) -> bool {
        self.title.is_some()
            || self.author.is_some()
            || self.subject.is_some()
            || !self.keywords.is_empty()
            || self.created.is_some()
            || self.modified.is_some()
            || self.creator_app.is_some()
    }

    /// Set keywords from a single delimited string.
    pub fn set_keywords(&mut self, raw: &str) {
        self.keywords = raw
            .split([',', ';'])
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect();
    }
}

/// Parse a timestamp as written by OPF metadata or property sets.
///
/// Accepts RFC 3339 and the zone-less `YYYY-MM-DDTHH:MM:SS` form (taken as
/// UTC). Anything else is `None`.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_split() {
        let mut meta = Metadata::default();
        meta.set_keywords("보고서, 2024;  ;draft");
        assert_eq!(meta.keywords, vec!["보고서", "2024", "draft"]);
        assert!(meta.has_data());
    }

    #[test]
    fn test_parse_timestamp() {
        let dt = parse_timestamp("2024-03-05T10:20:30Z").unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-03-05T10:20:30+00:00");
        let dt = parse_timestamp("2024-03-05T19:20:30+09:00").unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-03-05T10:20:30+00:00");
        assert!(parse_timestamp("2024-03-05T10:20:30").is_some());
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("").is_none());
    }
}
