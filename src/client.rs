//! Search facade
//!
//! [`SearchClient`] wires a backend handle and configuration into
//! independently configurable query builders, and owns the
//! process-lifetime cache of discovered channels.

use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::backend::{HttpBackend, SearchBackend};
use crate::channel::Channel;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::query::{OptionQuery, PackageQuery};

/// Entry point for package and option searches
pub struct SearchClient {
    backend: Arc<dyn SearchBackend>,
    config: Arc<ClientConfig>,
    channels: OnceCell<Vec<Channel>>,
}

impl SearchClient {
    /// Create a client backed by the configured HTTP endpoint
    pub fn new(config: ClientConfig) -> Result<Self> {
        let backend = Arc::new(HttpBackend::new(&config)?);
        Ok(Self::with_backend(config, backend))
    }

    /// Create a client with an injected backend (used by tests and
    /// alternative transports)
    pub fn with_backend(config: ClientConfig, backend: Arc<dyn SearchBackend>) -> Self {
        Self {
            backend,
            config: Arc::new(config),
            channels: OnceCell::new(),
        }
    }

    /// A fresh, independently configurable package query builder
    pub fn packages(&self) -> PackageQuery {
        PackageQuery::new(self.backend.clone(), self.config.clone())
    }

    /// A fresh, independently configurable option query builder
    pub fn options(&self) -> OptionQuery {
        OptionQuery::new(self.backend.clone(), self.config.clone())
    }

    /// Discover the channels available on the backend.
    ///
    /// Lists index aliases under the version-scoped prefix, strips the
    /// prefix and deduplicates. The result is memoized for the process
    /// lifetime; channel sets change on the order of months and a fresh
    /// process re-discovers.
    pub async fn discover_channels(&self) -> Result<&[Channel]> {
        let channels = self
            .channels
            .get_or_try_init(|| async {
                let prefix = format!("latest-{}-", self.config.schema_version);
                debug!(%prefix, "discovering channels");
                let aliases = self.backend.list_aliases(&prefix).await?;

                let mut channels: Vec<Channel> = Vec::new();
                for alias in &aliases {
                    let Some(suffix) = alias.strip_prefix(&prefix) else {
                        continue;
                    };
                    // A bare-prefix alias carries no channel name
                    if suffix.trim().is_empty() {
                        continue;
                    }
                    let channel = Channel::from_value(suffix)?;
                    if !channels.contains(&channel) {
                        channels.push(channel);
                    }
                }
                info!(count = channels.len(), "discovered channels");
                Ok(channels)
            })
            .await?;
        Ok(channels.as_slice())
    }

    /// Resolve a symbolic channel name (`unstable`, `stable`, `beta`,
    /// `flakes`) against the discovered channel set
    pub async fn resolve_channel(&self, symbolic: &str) -> Result<Channel> {
        let available = self.discover_channels().await?;
        Channel::parse(symbolic, available)
    }
}
