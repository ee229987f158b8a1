//! Error types for paperwise.

use thiserror::Error;

/// Result type alias using paperwise's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for paperwise operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Profile signal store could not be read
    #[error("Signal store error: {0}")]
    SignalStore(String),

    /// Candidate source query failed
    #[error("Source error: {0}")]
    Source(String),

    /// Upstream record rejected at the source boundary
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    /// Inference/generation failed
    #[error("Inference error: {0}")]
    Inference(String),

    /// Cache backend failed
    #[error("Cache error: {0}")]
    Cache(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether this error means the user's profile signals were unreachable.
    ///
    /// These are the only failures surfaced by the recommendation pipeline.
    pub fn is_signal_failure(&self) -> bool {
        matches!(self, Error::SignalStore(_) | Error::Database(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_not_found() {
        let err = Error::NotFound("user".to_string());
        assert_eq!(err.to_string(), "Not found: user");
    }

    #[test]
    fn test_error_display_signal_store() {
        let err = Error::SignalStore("connection refused".to_string());
        assert_eq!(err.to_string(), "Signal store error: connection refused");
    }

    #[test]
    fn test_error_display_source() {
        let err = Error::Source("esearch returned 502".to_string());
        assert_eq!(err.to_string(), "Source error: esearch returned 502");
    }

    #[test]
    fn test_error_display_malformed_record() {
        let err = Error::MalformedRecord("missing title".to_string());
        assert_eq!(err.to_string(), "Malformed record: missing title");
    }

    #[test]
    fn test_error_display_cache() {
        let err = Error::Cache("redis down".to_string());
        assert_eq!(err.to_string(), "Cache error: redis down");
    }

    #[test]
    fn test_error_display_config() {
        let err = Error::Config("min_papers_per_section must be > 0".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: min_papers_per_section must be > 0"
        );
    }

    #[test]
    fn test_signal_failure_classification() {
        assert!(Error::SignalStore("x".to_string()).is_signal_failure());
        assert!(Error::Database(sqlx::Error::PoolTimedOut).is_signal_failure());
        assert!(!Error::Source("x".to_string()).is_signal_failure());
        assert!(!Error::Cache("x".to_string()).is_signal_failure());
        assert!(!Error::Inference("x".to_string()).is_signal_failure());
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number").unwrap_err();
        let err: Error = json_err.into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
