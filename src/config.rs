use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Static client configuration shared by all query builders
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the document-search backend
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Optional basic-auth username
    pub username: Option<String>,

    /// Optional basic-auth password
    pub password: Option<String>,

    /// Index schema version; index names are built as
    /// `latest-{schema_version}-{channel}`
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Per-attempt request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Maximum number of retries after a transient failure
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Total time budget for the retry sequence (seconds)
    #[serde(default = "default_max_retry_time")]
    pub max_retry_time_secs: u64,

    /// Top-N bucket count requested per aggregation facet
    #[serde(default = "default_facet_size")]
    pub facet_size: usize,

    /// Log serialized query bodies at debug level
    #[serde(default)]
    pub debug: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            username: None,
            password: None,
            schema_version: default_schema_version(),
            request_timeout_secs: default_request_timeout(),
            max_retries: default_max_retries(),
            max_retry_time_secs: default_max_retry_time(),
            facet_size: default_facet_size(),
            debug: false,
        }
    }
}

impl ClientConfig {
    /// Load configuration from an optional file and environment.
    ///
    /// Layering, weakest first: built-in defaults, the TOML file named
    /// by `NIX_SEARCH_CONFIG` (if any), then `NIX_SEARCH_*` environment
    /// variables.
    pub fn load() -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Ok(path) = std::env::var("NIX_SEARCH_CONFIG") {
            builder = builder.add_source(config::File::with_name(&path).required(false));
        }

        builder
            .add_source(
                config::Environment::with_prefix("NIX_SEARCH")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| Error::Config(e.to_string()))
    }
}

fn default_endpoint() -> String {
    "https://search.nixos.org/backend".to_string()
}

fn default_schema_version() -> u32 {
    44
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_max_retry_time() -> u64 {
    60
}

fn default_facet_size() -> usize {
    20
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.schema_version, 44);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.max_retry_time_secs, 60);
        assert_eq!(config.facet_size, 20);
        assert!(!config.debug);
        assert!(config.username.is_none());
    }

    #[test]
    fn test_config_roundtrip() {
        let config = ClientConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: ClientConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.endpoint, config.endpoint);
        assert_eq!(parsed.schema_version, config.schema_version);
    }
}
