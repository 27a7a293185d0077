//! Error types for the zonedash core
//!
//! Most of these are recovered locally: the zone parser skips lines that
//! produce a [`Error::Format`], and IP discovery moves on to the next provider
//! after an [`Error::Validation`] or [`Error::ExternalService`]. Only
//! [`Error::NoProviders`] is fatal to discovery.

use thiserror::Error;

/// Result type alias for zonedash operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for zonedash
#[derive(Error, Debug)]
pub enum Error {
    /// A zone-file line could not be turned into a record
    #[error("Zone format error: {0}")]
    Format(String),

    /// A fetched value failed its format check
    #[error("Validation error: {0}")]
    Validation(String),

    /// No IP discovery provider is enabled
    #[error("No IP providers enabled")]
    NoProviders,

    /// An IP discovery provider could not be reached or answered with an error
    #[error("External service error ({provider}): {message}")]
    ExternalService {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// No record client is configured for a domain
    #[error("No DNS client configured for domain {0}")]
    NoClient(String),

    /// State store-related errors
    #[error("State store error: {0}")]
    StateStore(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// Record not found
    #[error("Record not found: {0}")]
    NotFound(String),

    /// DNS provider client error
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a zone format error
    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an external service error
    pub fn external(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExternalService {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a state store error
    pub fn state_store(msg: impl Into<String>) -> Self {
        Self::StateStore(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a provider client error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_external_service_display() {
        let err = Error::external("ipify", "connection refused");
        assert_eq!(
            err.to_string(),
            "External service error (ipify): connection refused"
        );
    }

    #[test]
    fn test_anyhow_context_survives_conversion() {
        fn load() -> Result<()> {
            use anyhow::Context;

            let inner: anyhow::Result<()> = Err(anyhow::anyhow!("disk full"));
            inner.context("writing config.json")?;
            Ok(())
        }

        let err = load().unwrap_err();
        assert!(matches!(err, Error::Other(_)));
        assert_eq!(err.to_string(), "writing config.json");
    }
}
