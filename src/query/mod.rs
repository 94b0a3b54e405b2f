//! Query composition and execution
//!
//! The builder hierarchy of classic search clients is replaced here by
//! composition: a [`RequestSpec`] value holds the generic query state
//! (channel, text, pagination window, sort order), the concrete
//! builders in [`packages`] and [`options`] assemble document-kind
//! specific bodies, and a neutral executor owns retry, backoff and
//! response validation for every query kind.

mod options;
mod packages;

pub use options::OptionQuery;
pub use packages::PackageQuery;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use crate::backend::{BackendResponse, SearchBackend};
use crate::channel::Channel;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::models::{FacetCount, SearchResults};

/// Explicit result ordering; unset means relevance
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    /// Wire value used in sort descriptors
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "asc",
            SortOrder::Descending => "desc",
        }
    }
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Ascending),
            "desc" | "descending" => Ok(SortOrder::Descending),
            other => Err(Error::Validation(format!(
                "unknown sort order '{}', expected 'asc' or 'desc'",
                other
            ))),
        }
    }
}

/// Generic query state shared by all builders
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    pub channel: Channel,
    pub query: String,
    pub from: usize,
    pub size: usize,
    pub sort: Option<SortOrder>,
}

impl Default for RequestSpec {
    fn default() -> Self {
        Self {
            channel: Channel::unstable(),
            query: String::new(),
            from: 0,
            size: 50,
            sort: None,
        }
    }
}

impl RequestSpec {
    /// Set the pagination window, validating at the point of mutation
    pub fn page(&mut self, from: i64, size: i64) -> Result<()> {
        if from < 0 {
            return Err(Error::Validation(format!(
                "page offset must be non-negative, got {}",
                from
            )));
        }
        if size <= 0 {
            return Err(Error::Validation(format!(
                "page size must be positive, got {}",
                size
            )));
        }
        self.from = from as usize;
        self.size = size as usize;
        Ok(())
    }
}

/// Concrete index name for a channel: `latest-{schema_version}-{channel}`
pub fn index_name(config: &ClientConfig, channel: &Channel) -> String {
    format!("latest-{}-{}", config.schema_version, channel.value())
}

/// Backoff delay before retry number `attempt` (zero-based), capped at 30s
pub(crate) fn backoff_delay(attempt: u32) -> Duration {
    let millis = 1_000u64
        .saturating_mul(2_u64.saturating_pow(attempt))
        .min(30_000);
    Duration::from_millis(millis)
}

/// Dispatch a query body with transient-failure retry and response
/// validation.
///
/// Transient failures retry with exponential backoff up to
/// `max_retries` attempts within the `max_retry_time_secs` budget;
/// the last transient failure then propagates unchanged. Backend
/// rejections are deterministic and never retried.
pub(crate) async fn execute_search(
    backend: &dyn SearchBackend,
    config: &ClientConfig,
    index: &str,
    body: &Value,
) -> Result<BackendResponse> {
    if config.debug {
        debug!(index, body = %body, "search query body");
    }

    let started = Instant::now();
    let budget = Duration::from_secs(config.max_retry_time_secs);
    let mut attempt: u32 = 0;

    loop {
        match backend.search(index, body).await {
            Ok(response) => return response.ensure_success(),
            Err(err) if err.is_transient() => {
                if attempt >= config.max_retries {
                    return Err(err);
                }
                let delay = backoff_delay(attempt);
                if started.elapsed() + delay > budget {
                    return Err(err);
                }
                warn!(
                    index,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "transient search failure, retrying"
                );
                sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

/// Execute a body and deserialize the returned page of documents.
///
/// Hits that fail to deserialize are skipped with a warning; document
/// schemas drift across channels and a partial page beats a hard error.
pub(crate) async fn run_query<T: serde::de::DeserializeOwned>(
    backend: &dyn SearchBackend,
    config: &ClientConfig,
    channel: &Channel,
    body: &Value,
) -> Result<SearchResults<T>> {
    let index = index_name(config, channel);
    let response = execute_search(backend, config, &index, body).await?;

    let results = response
        .hits
        .into_iter()
        .filter_map(|hit| match serde_json::from_value::<T>(hit) {
            Ok(document) => Some(document),
            Err(err) => {
                warn!(%index, error = %err, "skipping undecodable hit");
                None
            }
        })
        .collect();

    Ok(SearchResults {
        total: response.total,
        results,
        facets: parse_facets(response.aggregations.as_ref()),
    })
}

/// Flatten terms-aggregation buckets into facet counts
pub(crate) fn parse_facets(aggregations: Option<&Value>) -> BTreeMap<String, Vec<FacetCount>> {
    let mut facets = BTreeMap::new();
    let Some(aggregations) = aggregations.and_then(|a| a.as_object()) else {
        return facets;
    };
    for (field, aggregation) in aggregations {
        let Some(buckets) = aggregation.get("buckets").and_then(|b| b.as_array()) else {
            continue;
        };
        let counts = buckets
            .iter()
            .filter_map(|bucket| {
                let value = bucket.get("key").and_then(|k| k.as_str())?;
                let count = bucket.get("doc_count").and_then(|c| c.as_u64())?;
                Some(FacetCount {
                    value: value.to_string(),
                    count,
                })
            })
            .collect();
        facets.insert(field.clone(), counts);
    }
    facets
}

/// Render a field-weight table as `field^weight` selectors
pub(crate) fn weighted_fields(table: &[(&str, f64)]) -> Vec<String> {
    table
        .iter()
        .map(|(field, weight)| format!("{}^{}", field, weight))
        .collect()
}

/// The scored half of every query body: a dismax of a cross-fields
/// weighted multi-match and a case-insensitive substring wildcard, with
/// a 0.7 tie breaker so neither alternative fully dominates.
pub(crate) fn dismax_query(query: &str, table: &[(&str, f64)], wildcard_field: &str) -> Value {
    if query.is_empty() {
        return serde_json::json!({ "match_all": {} });
    }
    serde_json::json!({
        "dis_max": {
            "tie_breaker": 0.7,
            "queries": [
                {
                    "multi_match": {
                        "type": "cross_fields",
                        "query": query,
                        "analyzer": "whitespace",
                        "auto_generate_synonyms_phrase_query": false,
                        "operator": "AND",
                        "fields": weighted_fields(table),
                    }
                },
                {
                    "wildcard": {
                        (wildcard_field): {
                            "value": format!("*{}*", query),
                            "case_insensitive": true,
                        }
                    }
                }
            ]
        }
    })
}

/// Blocking wrapper around an async execution path.
///
/// Drives the identical async logic (retry included) on a
/// current-thread runtime; must not be called from within an async
/// context.
pub(crate) fn block_on<F, T>(future: F) -> Result<T>
where
    F: std::future::Future<Output = Result<T>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::Config(format!("failed to create blocking runtime: {}", e)))?;
    runtime.block_on(future)
}
