//! Document-search service contract
//!
//! The backend is an opaque collaborator: given an index name and a
//! structured query body it returns either a successful page of
//! documents or an unsuccessful response carrying a native exception or
//! a structured server error. Network-level failures surface as
//! [`Error::Transient`](crate::error::Error) and are the only errors
//! the executor retries.

mod http;

pub use http::HttpBackend;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// Structured failure reported by the search backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerError {
    /// Human-readable failure reason
    pub reason: Option<String>,

    /// HTTP-level status reported alongside the failure
    pub status: Option<u16>,
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.reason, self.status) {
            (Some(reason), Some(status)) => write!(f, "{} (status {})", reason, status),
            (Some(reason), None) => f.write_str(reason),
            (None, Some(status)) => write!(f, "status {}", status),
            (None, None) => f.write_str("unspecified server error"),
        }
    }
}

impl std::error::Error for ServerError {}

/// Raw response from the document-search service
#[derive(Debug, Clone)]
pub struct BackendResponse {
    /// Whether the backend accepted and executed the query
    pub success: bool,

    /// Native exception message, if the backend raised one
    pub exception: Option<String>,

    /// Structured server error, if the backend reported one
    pub server_error: Option<ServerError>,

    /// Total hit count across all pages
    pub total: u64,

    /// The returned page of documents (`_source` objects)
    pub hits: Vec<serde_json::Value>,

    /// Aggregation buckets keyed by facet name
    pub aggregations: Option<serde_json::Value>,
}

impl BackendResponse {
    /// Convert an unsuccessful response into a typed backend error.
    ///
    /// The message prefers the native exception, then the structured
    /// server-error reason, then a literal `Unknown error`; the
    /// structured error is preserved as the inner cause.
    pub fn ensure_success(self) -> Result<BackendResponse> {
        if self.success {
            return Ok(self);
        }
        let reason = self
            .exception
            .clone()
            .or_else(|| self.server_error.as_ref().and_then(|e| e.reason.clone()))
            .unwrap_or_else(|| "Unknown error".to_string());
        let source = self
            .server_error
            .map(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>);
        Err(Error::Backend { reason, source })
    }
}

/// Contract of the external document-search service
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Execute a query body against the named index.
    ///
    /// Deterministic backend rejections come back as `Ok` responses
    /// with `success == false`; only network-level failures are `Err`.
    async fn search(&self, index: &str, body: &serde_json::Value) -> Result<BackendResponse>;

    /// List index aliases matching the given prefix
    async fn list_aliases(&self, prefix: &str) -> Result<Vec<String>>;
}
