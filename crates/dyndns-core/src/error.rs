//! Error types for the dyndns synchronizer
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for dyndns operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the dyndns synchronizer
#[derive(Error, Debug)]
pub enum Error {
    /// Public IP lookup errors (all services exhausted, bad response body)
    #[error("IP lookup error: {0}")]
    IpLookup(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP client errors (transport failures, non-2xx statuses)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Provider-reported application error (success flag false)
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },
}

impl Error {
    /// Create an IP lookup error
    pub fn ip_lookup(msg: impl Into<String>) -> Self {
        Self::IpLookup(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_the_failure_detail() {
        assert_eq!(
            Error::ip_lookup("all lookup services failed").to_string(),
            "IP lookup error: all lookup services failed"
        );
        assert_eq!(
            Error::config("Zone ID cannot be empty").to_string(),
            "Configuration error: Zone ID cannot be empty"
        );
        assert_eq!(
            Error::http("request failed: timeout").to_string(),
            "HTTP error: request failed: timeout"
        );
        assert_eq!(
            Error::provider("cloudflare", "Authentication error").to_string(),
            "Provider error (cloudflare): Authentication error"
        );
    }
}
