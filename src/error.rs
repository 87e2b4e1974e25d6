//! Error types for the ISOStream client
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for the ISOStream client
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Authentication Errors
    // ============================================================================
    #[error("Authentication failed ({status}): {message}")]
    Auth { status: u16, message: String },

    // ============================================================================
    // Call Errors
    // ============================================================================
    #[error("No API method named '{name}'")]
    UnknownMethod { name: String },

    #[error("{operation}(): {message}")]
    Argument { operation: String, message: String },

    #[error("Query parameters produced no results for {operation}")]
    EmptyResult { operation: String },

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Error in API call (HTTP {status}): {message}")]
    Api {
        status: u16,
        message: String,
        body: String,
    },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Data Processing Errors
    // ============================================================================
    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    #[error("Ambiguous pivot: more than one row for index '{index}' and key '{key}'")]
    AmbiguousPivot { index: String, key: String },

    #[error("Pivot failed: {message}")]
    Pivot { message: String },

    // ============================================================================
    // Arrow/Parquet Errors
    // ============================================================================
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Output error: {message}")]
    Output { message: String },

    // ============================================================================
    // Cache Errors
    // ============================================================================
    #[error("Cache error: {message}")]
    Cache { message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an auth error
    pub fn auth(status: u16, message: impl Into<String>) -> Self {
        Self::Auth {
            status,
            message: message.into(),
        }
    }

    /// Create an API error
    pub fn api(status: u16, message: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
            body: body.into(),
        }
    }

    /// Create an unknown method error
    pub fn unknown_method(name: impl Into<String>) -> Self {
        Self::UnknownMethod { name: name.into() }
    }

    /// Create an argument error
    pub fn argument(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Argument {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create an error for a required parameter the caller did not supply
    pub fn missing_argument(operation: impl Into<String>, name: &str) -> Self {
        Self::argument(operation, format!("missing keyword-only argument '{name}'"))
    }

    /// Create an error for parameters the operation does not declare
    pub fn unexpected_argument(operation: impl Into<String>, names: &[&str]) -> Self {
        Self::argument(
            operation,
            format!("got an unexpected keyword argument: '{}'", names.join(",")),
        )
    }

    /// Create an empty result error
    pub fn empty_result(operation: impl Into<String>) -> Self {
        Self::EmptyResult {
            operation: operation.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create an ambiguous pivot error
    pub fn ambiguous_pivot(index: impl Into<String>, key: impl Into<String>) -> Self {
        Self::AmbiguousPivot {
            index: index.into(),
            key: key.into(),
        }
    }

    /// Create a pivot error
    pub fn pivot(message: impl Into<String>) -> Self {
        Self::Pivot {
            message: message.into(),
        }
    }

    /// Create a cache error
    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    /// Create an output error
    pub fn output(message: impl Into<String>) -> Self {
        Self::Output {
            message: message.into(),
        }
    }

    /// Check if this error was raised before any network I/O took place
    pub fn is_client_side(&self) -> bool {
        matches!(
            self,
            Error::Config { .. }
                | Error::UnknownMethod { .. }
                | Error::Argument { .. }
                | Error::InvalidUrl(_)
        )
    }

    /// HTTP status reported by the remote API, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Auth { status, .. } | Error::Api { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Result type alias for the ISOStream client
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::missing_argument("dalmp_node", "start");
        assert_eq!(
            err.to_string(),
            "dalmp_node(): missing keyword-only argument 'start'"
        );

        let err = Error::unexpected_argument("dalmp_node", &["foo", "bar"]);
        assert_eq!(
            err.to_string(),
            "dalmp_node(): got an unexpected keyword argument: 'foo,bar'"
        );

        let err = Error::api(422, "parameter 'start': field required", "{}");
        assert_eq!(
            err.to_string(),
            "Error in API call (HTTP 422): parameter 'start': field required"
        );
    }

    #[test]
    fn test_is_client_side() {
        assert!(Error::missing_argument("op", "start").is_client_side());
        assert!(Error::unknown_method("nope").is_client_side());
        assert!(Error::config("bad doc").is_client_side());

        assert!(!Error::api(500, "", "").is_client_side());
        assert!(!Error::auth(401, "bad key").is_client_side());
        assert!(!Error::ambiguous_pivot("a", "b").is_client_side());
    }

    #[test]
    fn test_status() {
        assert_eq!(Error::auth(403, "").status(), Some(403));
        assert_eq!(Error::api(404, "", "").status(), Some(404));
        assert_eq!(Error::pivot("x").status(), None);
    }

    #[test]
    fn test_result_context() {
        let result: Result<()> = Err(Error::config("inner"));
        let with_context = result.context("outer");
        assert!(with_context
            .unwrap_err()
            .to_string()
            .contains("outer: Configuration error: inner"));
    }
}
