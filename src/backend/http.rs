//! Elasticsearch-compatible HTTP backend

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::{BackendResponse, SearchBackend, ServerError};
use crate::config::ClientConfig;
use crate::error::{Error, Result};

/// HTTP implementation of the document-search contract
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    endpoint: String,
    username: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EsSearchBody {
    hits: EsHits,
    aggregations: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct EsHits {
    total: EsTotal,
    hits: Vec<EsHit>,
}

#[derive(Debug, Deserialize)]
struct EsTotal {
    value: u64,
}

#[derive(Debug, Deserialize)]
struct EsHit {
    #[serde(rename = "_source")]
    source: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct EsErrorBody {
    error: Option<EsErrorDetail>,
    status: Option<u16>,
}

#[derive(Debug, Deserialize)]
struct EsErrorDetail {
    reason: Option<String>,
}

impl HttpBackend {
    /// Create a backend against the configured endpoint
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    fn request(&self, method: Method, url: String) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.username {
            Some(username) => builder.basic_auth(username, self.password.as_deref()),
            None => builder,
        }
    }

    fn parse_server_error(status: StatusCode, payload: &serde_json::Value) -> ServerError {
        let body: EsErrorBody =
            serde_json::from_value(payload.clone()).unwrap_or(EsErrorBody {
                error: None,
                status: None,
            });
        ServerError {
            reason: body.error.and_then(|e| e.reason),
            status: Some(body.status.unwrap_or_else(|| status.as_u16())),
        }
    }
}

#[async_trait]
impl SearchBackend for HttpBackend {
    async fn search(&self, index: &str, body: &serde_json::Value) -> Result<BackendResponse> {
        let url = format!("{}/{}/_search", self.endpoint, index);
        debug!(%url, "dispatching search request");

        let response = self
            .request(Method::POST, url)
            .json(body)
            .send()
            .await
            .map_err(Error::from_transport)?;

        let status = response.status();
        let payload: serde_json::Value =
            response.json().await.map_err(Error::from_transport)?;

        if !status.is_success() {
            let server_error = Self::parse_server_error(status, &payload);
            warn!(index, status = status.as_u16(), error = %server_error, "search request rejected");
            return Ok(BackendResponse {
                success: false,
                exception: None,
                server_error: Some(server_error),
                total: 0,
                hits: vec![],
                aggregations: None,
            });
        }

        let parsed: EsSearchBody = serde_json::from_value(payload).map_err(|e| Error::Backend {
            reason: format!("malformed search response: {}", e),
            source: Some(Box::new(e)),
        })?;

        Ok(BackendResponse {
            success: true,
            exception: None,
            server_error: None,
            total: parsed.hits.total.value,
            hits: parsed.hits.hits.into_iter().map(|h| h.source).collect(),
            aggregations: parsed.aggregations,
        })
    }

    async fn list_aliases(&self, prefix: &str) -> Result<Vec<String>> {
        let url = format!("{}/_alias/{}*", self.endpoint, prefix);
        debug!(%url, "listing index aliases");

        let response = self
            .request(Method::GET, url)
            .send()
            .await
            .map_err(Error::from_transport)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(vec![]);
        }

        let payload: serde_json::Value =
            response.json().await.map_err(Error::from_transport)?;

        if !status.is_success() {
            let server_error = Self::parse_server_error(status, &payload);
            return Err(Error::Backend {
                reason: server_error.to_string(),
                source: Some(Box::new(server_error)),
            });
        }

        // Response shape: { "<index>": { "aliases": { "<alias>": {} } } }
        let mut aliases = Vec::new();
        if let Some(indices) = payload.as_object() {
            for index in indices.values() {
                if let Some(names) = index.get("aliases").and_then(|a| a.as_object()) {
                    for name in names.keys() {
                        if name.starts_with(prefix) && !aliases.contains(name) {
                            aliases.push(name.clone());
                        }
                    }
                }
            }
        }
        Ok(aliases)
    }
}
