use thiserror::Error;

/// Errors surfaced by the search client
#[derive(Debug, Error)]
pub enum Error {
    /// Caller supplied an out-of-range or unrecognized argument
    #[error("Validation error: {0}")]
    Validation(String),

    /// A recognized channel keyword could not be matched against the
    /// discovered channel set
    #[error("Channel resolution failed: {0}")]
    Resolution(String),

    /// Network-level failure that is worth retrying
    #[error("Transient search failure: {message}")]
    Transient {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The search backend itself reported a failure; never retried
    #[error("Search request failed: {reason}")]
    Backend {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration loading or client construction failure
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether the executor should retry after this error
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Transient { .. })
    }

    /// Classify a transport-level failure from the HTTP client.
    ///
    /// Timeouts, connect failures and interrupted body transfers are
    /// transient; anything else (request construction, malformed
    /// response payloads) is deterministic and surfaces as a backend
    /// failure rather than spending the retry budget.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() || err.is_body() {
            Error::Transient {
                message: err.to_string(),
                source: Some(Box::new(err)),
            }
        } else {
            Error::Backend {
                reason: err.to_string(),
                source: Some(Box::new(err)),
            }
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        let err = Error::Transient {
            message: "connection reset".to_string(),
            source: None,
        };
        assert!(err.is_transient());
        assert!(!Error::Validation("bad page".to_string()).is_transient());
        assert!(!Error::Backend {
            reason: "index missing".to_string(),
            source: None,
        }
        .is_transient());
    }

    #[test]
    fn test_backend_message_prefix() {
        let err = Error::Backend {
            reason: "Connection failed".to_string(),
            source: None,
        };
        assert_eq!(err.to_string(), "Search request failed: Connection failed");
    }
}
