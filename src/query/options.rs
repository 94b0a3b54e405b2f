//! Option query builder
//!
//! The smaller sibling of the package builder: no filter dimensions
//! beyond the channel, and a shorter field-weight table.

use serde_json::{json, Value};
use std::sync::Arc;

use super::{dismax_query, run_query, RequestSpec, SortOrder};
use crate::backend::SearchBackend;
use crate::channel::Channel;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::models::{NixOption, SearchResults};

const MATCH_FIELDS: &[(&str, f64)] = &[
    ("option_name", 6.0),
    ("option_name.*", 3.6),
    ("option_description", 1.0),
    ("option_description.*", 0.6),
    ("flake_name", 0.5),
    ("flake_name.*", 0.3),
];

/// Fluent builder for option searches
#[derive(Clone)]
pub struct OptionQuery {
    backend: Arc<dyn SearchBackend>,
    config: Arc<ClientConfig>,
    spec: RequestSpec,
}

impl OptionQuery {
    pub(crate) fn new(backend: Arc<dyn SearchBackend>, config: Arc<ClientConfig>) -> Self {
        Self {
            backend,
            config,
            spec: RequestSpec::default(),
        }
    }

    /// Target a specific release channel (default: unstable)
    pub fn for_channel(mut self, channel: Channel) -> Self {
        self.spec.channel = channel;
        self
    }

    /// Set the free-text query; `None` preserves the prior value
    pub fn with_query<S: Into<String>>(mut self, text: Option<S>) -> Self {
        if let Some(text) = text {
            self.spec.query = text.into();
        }
        self
    }

    /// Set the pagination window; rejects negative offsets and
    /// non-positive sizes at the point of the call
    pub fn page(mut self, from: i64, size: i64) -> Result<Self> {
        self.spec.page(from, size)?;
        Ok(self)
    }

    /// Request an explicit ordering; `None` restores relevance sorting
    pub fn sort_by(mut self, order: Option<SortOrder>) -> Self {
        self.spec.sort = order;
        self
    }

    fn sort_descriptor(&self) -> Value {
        match self.spec.sort {
            None => json!([
                { "_score": "desc" },
                { "option_name": "desc" }
            ]),
            Some(order) => json!([{ "option_name": order.as_str() }]),
        }
    }

    /// The full query body; pure and deterministic for a fixed
    /// configuration
    pub fn body(&self) -> Value {
        json!({
            "from": self.spec.from,
            "size": self.spec.size,
            "sort": self.sort_descriptor(),
            "query": {
                "bool": {
                    "filter": [{ "term": { "type": { "value": "option" } } }],
                    "must": [dismax_query(&self.spec.query, MATCH_FIELDS, "option_name")],
                }
            },
        })
    }

    /// Execute the query and return the validated page of options
    pub async fn execute(&self) -> Result<SearchResults<NixOption>> {
        run_query(
            self.backend.as_ref(),
            &self.config,
            &self.spec.channel,
            &self.body(),
        )
        .await
    }

    /// Blocking variant of [`execute`](Self::execute); applies the same
    /// retry and validation logic on a private runtime
    pub fn execute_blocking(&self) -> Result<SearchResults<NixOption>> {
        super::block_on(self.execute())
    }
}
