//! Error types for the wenku8 client.
//!
//! Uses `thiserror` for structured error definitions. Network failures,
//! rate limiting and page-layout mismatches are kept as distinct variants
//! so callers can decide which of them are worth retrying.

use thiserror::Error;

/// Main error type for client operations.
#[derive(Error, Debug)]
pub enum ClientError {
    /// A privileged operation was attempted without a session
    #[error("Not logged in")]
    NotAuthenticated,

    /// The site answered with HTTP 429
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// The site answered with any other non-success status
    #[error("HTTP {status} from {url}")]
    Transport { status: u16, url: String },

    /// Connection-level failure before a status was received
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Expected content is missing from the page
    #[error("Element not found: {0}")]
    Extraction(String),

    /// A numeric or identifier field could not be parsed
    #[error("Invalid value for '{field}': {value:?}")]
    InvalidValue { field: &'static str, value: String },

    /// URL construction or parsing failed
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Login request succeeded but no session cookie was issued
    #[error("Login failed: {0}")]
    LoginFailed(String),
}

impl ClientError {
    /// Returns true if backing off and retrying may succeed.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ClientError::RateLimited(_))
    }

    pub(crate) fn invalid(field: &'static str, value: impl Into<String>) -> Self {
        ClientError::InvalidValue {
            field,
            value: value.into(),
        }
    }
}

/// Error type for configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse config file
    #[error("Failed to parse config: {0}")]
    ParseError(String),

    /// Missing required configuration value
    #[error("Missing required config value: {0}")]
    MissingValue(String),

    /// Invalid configuration value
    #[error("Invalid config value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Config directory not found
    #[error("Could not determine config directory")]
    NoConfigDir,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_is_distinct() {
        assert!(ClientError::RateLimited("https://example.com".into()).is_rate_limited());
        let other = ClientError::Transport {
            status: 503,
            url: "https://example.com".into(),
        };
        assert!(!other.is_rate_limited());
        assert_eq!(other.to_string(), "HTTP 503 from https://example.com");
    }

    #[test]
    fn test_invalid_value_message() {
        let err = ClientError::invalid("word_count", "12a");
        assert_eq!(err.to_string(), "Invalid value for 'word_count': \"12a\"");
    }
}
