//! Package query builder
//!
//! Assembles the field-weighted, filter-aware query body for package
//! documents. The field weights mirror the upstream search deployment
//! and must stay byte-for-byte compatible with it for ranking parity.

use serde_json::{json, Value};
use std::sync::Arc;

use super::{dismax_query, run_query, RequestSpec, SortOrder};
use crate::backend::SearchBackend;
use crate::channel::Channel;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::models::{Package, SearchResults};

/// Match fields with relevance weights (field, weight); each field is
/// paired with its sub-token companion at 60% of the base weight
const MATCH_FIELDS: &[(&str, f64)] = &[
    ("package_attr_name", 9.0),
    ("package_attr_name.*", 5.4),
    ("package_programs", 9.0),
    ("package_programs.*", 5.4),
    ("package_pname", 6.0),
    ("package_pname.*", 3.6),
    ("package_description", 1.3),
    ("package_description.*", 0.78),
    ("package_longDescription", 1.0),
    ("package_longDescription.*", 0.6),
    ("flake_name", 0.5),
    ("flake_name.*", 0.3),
];

/// Filter and aggregation dimensions: (wire field, accumulator index)
const FACET_FIELDS: &[&str] = &[
    "package_attr_set",
    "package_license_set",
    "package_maintainers_set",
    "package_teams_set",
    "package_platforms",
];

/// Fluent builder for package searches.
///
/// Not safe for concurrent fluent configuration from multiple call
/// sites; configure on one owner, then execute.
#[derive(Clone)]
pub struct PackageQuery {
    backend: Arc<dyn SearchBackend>,
    config: Arc<ClientConfig>,
    spec: RequestSpec,
    package_sets: Vec<String>,
    licenses: Vec<String>,
    maintainers: Vec<String>,
    teams: Vec<String>,
    platforms: Vec<String>,
}

impl PackageQuery {
    pub(crate) fn new(backend: Arc<dyn SearchBackend>, config: Arc<ClientConfig>) -> Self {
        Self {
            backend,
            config,
            spec: RequestSpec::default(),
            package_sets: Vec::new(),
            licenses: Vec::new(),
            maintainers: Vec::new(),
            teams: Vec::new(),
            platforms: Vec::new(),
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

    /// Restrict to packages in any of the given package sets (appends)
    pub fn with_package_sets(mut self, values: Vec<impl Into<String>>) -> Self {
        self.package_sets.extend(values.into_iter().map(Into::into));
        self
    }

    /// Restrict to packages under any of the given licenses (appends)
    pub fn with_licenses(mut self, values: Vec<impl Into<String>>) -> Self {
        self.licenses.extend(values.into_iter().map(Into::into));
        self
    }

    /// Restrict to packages owned by any of the given maintainers (appends)
    pub fn with_maintainers(mut self, values: Vec<impl Into<String>>) -> Self {
        self.maintainers.extend(values.into_iter().map(Into::into));
        self
    }

    /// Restrict to packages owned by any of the given teams (appends)
    pub fn with_teams(mut self, values: Vec<impl Into<String>>) -> Self {
        self.teams.extend(values.into_iter().map(Into::into));
        self
    }

    /// Restrict to packages available on any of the given platforms (appends)
    pub fn with_platforms(mut self, values: Vec<impl Into<String>>) -> Self {
        self.platforms.extend(values.into_iter().map(Into::into));
        self
    }

    /// Accumulated filter values per dimension, in wire-field order
    fn filter_values(&self) -> [&Vec<String>; 5] {
        [
            &self.package_sets,
            &self.licenses,
            &self.maintainers,
            &self.teams,
            &self.platforms,
        ]
    }

    fn sort_descriptor(&self) -> Value {
        match self.spec.sort {
            None => json!([
                { "_score": "desc" },
                { "package_attr_name": "desc" },
                { "package_pversion": "desc" }
            ]),
            Some(order) => json!([
                { "package_attr_name": order.as_str() },
                { "package_pversion": order.as_str() }
            ]),
        }
    }

    fn aggregations(&self) -> Value {
        let mut aggs = serde_json::Map::new();
        for field in FACET_FIELDS {
            aggs.insert(
                (*field).to_string(),
                json!({ "terms": { "field": field, "size": self.config.facet_size } }),
            );
        }
        Value::Object(aggs)
    }

    /// The full query body; pure and deterministic for a fixed
    /// configuration
    pub fn body(&self) -> Value {
        let mut filter = vec![json!({ "term": { "type": { "value": "package" } } })];
        for (field, values) in FACET_FIELDS.iter().zip(self.filter_values()) {
            if values.is_empty() {
                continue;
            }
            let terms: Vec<Value> = values
                .iter()
                .map(|value| json!({ "term": { (*field): { "value": value } } }))
                .collect();
            filter.push(json!({ "bool": { "should": terms } }));
        }

        json!({
            "from": self.spec.from,
            "size": self.spec.size,
            "sort": self.sort_descriptor(),
            "query": {
                "bool": {
                    "filter": filter,
                    "must": [dismax_query(&self.spec.query, MATCH_FIELDS, "package_attr_name")],
                }
            },
            "aggs": self.aggregations(),
        })
    }

    /// Execute the query and return the validated page of packages
    pub async fn execute(&self) -> Result<SearchResults<Package>> {
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
    pub fn execute_blocking(&self) -> Result<SearchResults<Package>> {
        super::block_on(self.execute())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendResponse;
    use async_trait::async_trait;

    struct NullBackend;

    #[async_trait]
    impl SearchBackend for NullBackend {
        async fn search(&self, _index: &str, _body: &Value) -> Result<BackendResponse> {
            unreachable!("body tests never execute")
        }

        async fn list_aliases(&self, _prefix: &str) -> Result<Vec<String>> {
            unreachable!("body tests never execute")
        }
    }

    fn builder() -> PackageQuery {
        PackageQuery::new(Arc::new(NullBackend), Arc::new(ClientConfig::default()))
    }

    #[test]
    fn test_default_sort_breaks_ties_deterministically() {
        let body = builder().with_query(Some("firefox")).body();
        assert_eq!(
            body["sort"],
            json!([
                { "_score": "desc" },
                { "package_attr_name": "desc" },
                { "package_pversion": "desc" }
            ])
        );
    }

    #[test]
    fn test_explicit_sort_ignores_relevance() {
        let body = builder()
            .with_query(Some("firefox"))
            .sort_by(Some(SortOrder::Ascending))
            .body();
        assert_eq!(
            body["sort"],
            json!([
                { "package_attr_name": "asc" },
                { "package_pversion": "asc" }
            ])
        );
    }

    #[test]
    fn test_field_weights_in_match_query() {
        let body = builder().with_query(Some("rg")).body();
        let fields = body["query"]["bool"]["must"][0]["dis_max"]["queries"][0]["multi_match"]
            ["fields"]
            .as_array()
            .unwrap();
        assert!(fields.contains(&json!("package_attr_name^9")));
        assert!(fields.contains(&json!("package_attr_name.*^5.4")));
        assert!(fields.contains(&json!("package_programs^9")));
        assert!(fields.contains(&json!("package_description^1.3")));
        assert!(fields.contains(&json!("package_description.*^0.78")));
        assert!(fields.contains(&json!("flake_name.*^0.3")));
    }

    #[test]
    fn test_wildcard_alternative_and_tie_breaker() {
        let body = builder().with_query(Some("Fire")).body();
        let dis_max = &body["query"]["bool"]["must"][0]["dis_max"];
        assert_eq!(dis_max["tie_breaker"], json!(0.7));
        assert_eq!(
            dis_max["queries"][1]["wildcard"]["package_attr_name"],
            json!({ "value": "*Fire*", "case_insensitive": true })
        );
    }

    #[test]
    fn test_filters_intersect_dimensions() {
        let body = builder()
            .with_query(Some("editor"))
            .with_licenses(vec!["mit", "gpl3"])
            .with_platforms(vec!["x86_64-linux"])
            .body();
        let filter = body["query"]["bool"]["filter"].as_array().unwrap();
        // Type restriction plus one clause per populated dimension
        assert_eq!(filter.len(), 3);
        assert_eq!(filter[0], json!({ "term": { "type": { "value": "package" } } }));
        let license_terms = filter[1]["bool"]["should"].as_array().unwrap();
        assert_eq!(license_terms.len(), 2);
        assert_eq!(
            license_terms[0],
            json!({ "term": { "package_license_set": { "value": "mit" } } })
        );
    }

    #[test]
    fn test_filter_accumulators_append_in_call_order() {
        let query = builder()
            .with_licenses(vec!["mit"])
            .with_licenses(vec!["gpl3"]);
        assert_eq!(query.licenses, vec!["mit", "gpl3"]);
    }

    #[test]
    fn test_aggregations_always_requested() {
        let body = builder().with_query(Some("x")).body();
        let aggs = body["aggs"].as_object().unwrap();
        for field in FACET_FIELDS {
            assert_eq!(
                aggs[*field],
                json!({ "terms": { "field": field, "size": 20 } })
            );
        }
    }

    #[test]
    fn test_identical_configuration_yields_equal_bodies() {
        let a = builder()
            .with_query(Some("vim"))
            .with_licenses(vec!["mit"])
            .page(10, 25)
            .unwrap()
            .sort_by(Some(SortOrder::Descending));
        let b = builder()
            .with_query(Some("vim"))
            .with_licenses(vec!["mit"])
            .page(10, 25)
            .unwrap()
            .sort_by(Some(SortOrder::Descending));
        assert_eq!(a.body(), b.body());
    }

    #[test]
    fn test_none_query_preserves_prior_value() {
        let query = builder()
            .with_query(Some("emacs"))
            .with_query(None::<String>);
        assert_eq!(query.spec.query, "emacs");
    }
}
