//! Paginated envelope for protocol-server consumers
//!
//! RPC tool layers return search results in a uniform envelope rather
//! than the raw result page; the envelope carries the page window and a
//! precomputed `has_more` flag so agents can paginate without math.

use serde::{Deserialize, Serialize};

use crate::models::SearchResults;

/// Paginated response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolEnvelope<T> {
    /// Total hit count across all pages
    pub total: u64,

    /// Zero-based page number
    pub page: usize,

    /// Page size
    pub size: usize,

    /// Whether another page exists: `(page + 1) * size < total`
    pub has_more: bool,

    /// The returned page of documents
    pub results: Vec<T>,

    /// Non-fatal notices for the caller
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl<T> ToolEnvelope<T> {
    /// Wrap a result page retrieved with the given page window
    pub fn from_results(results: SearchResults<T>, page: usize, size: usize) -> Self {
        let has_more = ((page + 1) as u64).saturating_mul(size as u64) < results.total;
        Self {
            total: results.total,
            page,
            size,
            has_more,
            results: results.results,
            warnings: Vec::new(),
        }
    }

    /// Attach a non-fatal notice
    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn results(total: u64, count: usize) -> SearchResults<u32> {
        SearchResults {
            total,
            results: (0..count as u32).collect(),
            facets: BTreeMap::new(),
        }
    }

    #[test]
    fn test_has_more_math() {
        // 100 hits, page 0 of size 20: pages 1..4 remain
        assert!(ToolEnvelope::from_results(results(100, 20), 0, 20).has_more);
        // Page 4 is the last one
        assert!(!ToolEnvelope::from_results(results(100, 20), 4, 20).has_more);
        // Exact boundary: (page + 1) * size == total means no more
        assert!(!ToolEnvelope::from_results(results(40, 20), 1, 20).has_more);
        assert!(ToolEnvelope::from_results(results(41, 20), 1, 20).has_more);
    }

    #[test]
    fn test_warnings_omitted_when_empty() {
        let envelope = ToolEnvelope::from_results(results(1, 1), 0, 20);
        let json = serde_json::to_value(&envelope).unwrap();
        assert!(json.get("warnings").is_none());

        let with_warning = ToolEnvelope::from_results(results(1, 1), 0, 20)
            .with_warning("channel defaulted to unstable");
        let json = serde_json::to_value(&with_warning).unwrap();
        assert_eq!(json["warnings"][0], "channel defaulted to unstable");
    }
}
