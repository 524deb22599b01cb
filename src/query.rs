//! `SearchOptions` and `SearchQuery`: the complete, validated request
//! the coordinator executes (§3).

use crate::error::HaybaleError;
use crate::pattern::{self, PatternExpr};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

/// Filter bundle shared by every query.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub case_sensitive_content: bool,
    pub min_size_bytes: Option<u64>,
    pub max_size_bytes: Option<u64>,
    pub modified_after: Option<DateTime<Local>>,
    pub modified_before: Option<DateTime<Local>>,
    pub search_binaries: bool,
    pub include_hidden: bool,
    pub max_depth: Option<u32>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            case_sensitive_content: false,
            min_size_bytes: None,
            max_size_bytes: None,
            modified_after: None,
            modified_before: None,
            search_binaries: false,
            include_hidden: false,
            max_depth: None,
        }
    }
}

/// A complete, validated search request.
pub struct SearchQuery {
    pub root: PathBuf,
    pub name_pattern: Option<PatternExpr>,
    pub content_pattern: Option<PatternExpr>,
    pub options: SearchOptions,
}

impl SearchQuery {
    /// Parses `name_pattern_raw`/`content_pattern_raw` and validates the
    /// size/date bounds already present in `options`. Returns
    /// `InvalidRange` if `minSizeBytes > maxSizeBytes` or
    /// `modifiedAfter > modifiedBefore`.
    pub fn build(
        root: impl Into<PathBuf>,
        name_pattern_raw: Option<&str>,
        content_pattern_raw: Option<&str>,
        options: SearchOptions,
    ) -> Result<Self, HaybaleError> {
        let name_pattern = name_pattern_raw.map(pattern::parse).transpose()?;
        let content_pattern = content_pattern_raw.map(pattern::parse).transpose()?;

        if let (Some(min), Some(max)) = (options.min_size_bytes, options.max_size_bytes) {
            if min > max {
                return Err(HaybaleError::InvalidRange {
                    reason: format!("minSizeBytes ({min}) exceeds maxSizeBytes ({max})"),
                });
            }
        }
        if let (Some(after), Some(before)) = (options.modified_after, options.modified_before) {
            if after > before {
                return Err(HaybaleError::InvalidRange {
                    reason: "modifiedAfter is later than modifiedBefore".to_string(),
                });
            }
        }

        Ok(Self {
            root: root.into(),
            name_pattern,
            content_pattern,
            options,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_inverted_size_range() {
        let options = SearchOptions {
            min_size_bytes: Some(100),
            max_size_bytes: Some(10),
            ..Default::default()
        };
        let err = SearchQuery::build("/tmp", None, None, options).unwrap_err();
        assert!(matches!(err, HaybaleError::InvalidRange { .. }));
    }

    #[test]
    fn rejects_inverted_date_range() {
        let now = Local::now();
        let options = SearchOptions {
            modified_after: Some(now),
            modified_before: Some(now - chrono::Duration::days(1)),
            ..Default::default()
        };
        let err = SearchQuery::build("/tmp", None, None, options).unwrap_err();
        assert!(matches!(err, HaybaleError::InvalidRange { .. }));
    }

    #[test]
    fn propagates_pattern_parse_errors() {
        let err = SearchQuery::build("/tmp", Some("r:("), None, SearchOptions::default())
            .unwrap_err();
        assert!(matches!(err, HaybaleError::InvalidPattern { .. }));
    }

    #[test]
    fn accepts_a_well_formed_query() {
        let query = SearchQuery::build(
            "/tmp",
            Some("*.rs"),
            Some("r:fn main"),
            SearchOptions::default(),
        )
        .unwrap();
        assert!(query.name_pattern.is_some());
        assert!(query.content_pattern.is_some());
    }
}
