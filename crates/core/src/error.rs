//! Error types for headliner operations.
//!
//! [`HeadlinerError`] covers every failure a component can report. Most of them
//! never escape the component that produced them: the fetcher turns exhausted
//! retries into a [`FetchFailure`](crate::fetch::FetchFailure), the assembler
//! downgrades per-candidate errors to skipped candidates and the exporters report
//! a boolean outcome. Only configuration errors reach the caller unchanged.
//!
//! # Example
//!
//! ```rust
//! use headliner_core::{HeadlinerError, Result};
//!
//! fn require_retries(max_retries: u32) -> Result<()> {
//!     if max_retries == 0 {
//!         return Err(HeadlinerError::config("max_retries must be at least 1"));
//!     }
//!     Ok(())
//! }
//! # assert!(require_retries(0).is_err());
//! ```

use std::path::PathBuf;
use thiserror::Error;

#[cfg(feature = "xpath")]
use sxd_xpath::ExecutionError;

/// Main error type for scraping, extraction and export operations.
#[derive(Error, Debug)]
pub enum HeadlinerError {
    /// Transport-level HTTP errors from reqwest (DNS, connection refused, TLS, body decoding).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP {status} for {url}")]
    HttpStatus { status: u16, url: String },

    /// Request timeout.
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// Invalid URL provided, or an href that cannot be resolved.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A structural query failed to compile.
    #[error("Invalid query '{query}': {message}")]
    InvalidQuery { query: String, message: String },

    /// Markup could not be parsed into a queryable tree.
    #[error("Failed to parse markup: {0}")]
    MarkupParse(String),

    /// Configuration is missing, malformed or inconsistent.
    #[error("Configuration error: {0}")]
    Config(String),

    /// TOML configuration file could not be deserialized.
    #[error("Configuration file error: {0}")]
    Toml(#[from] toml::de::Error),

    /// File read/write errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Local listing file not found.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Spreadsheet serialization errors.
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),

    /// XPath evaluation errors.
    #[cfg(feature = "xpath")]
    #[error("XPath error: {0}")]
    XPath(String),
}

impl HeadlinerError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a query compilation error.
    pub fn invalid_query(query: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::InvalidQuery { query: query.into(), message: message.to_string() }
    }
}

#[cfg(feature = "xpath")]
impl From<ExecutionError> for HeadlinerError {
    fn from(err: ExecutionError) -> Self {
        HeadlinerError::XPath(err.to_string())
    }
}

/// Result type alias for HeadlinerError.
pub type Result<T> = std::result::Result<T, HeadlinerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HeadlinerError::InvalidUrl("not a url".to_string());
        assert!(err.to_string().contains("Invalid URL"));
    }

    #[test]
    fn test_http_status_error() {
        let err = HeadlinerError::HttpStatus { status: 503, url: "https://example.com".to_string() };
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("example.com"));
    }

    #[test]
    fn test_invalid_query_helper() {
        let err = HeadlinerError::invalid_query("article[", "unexpected end of input");
        assert!(err.to_string().contains("article["));
        assert!(err.to_string().contains("unexpected end"));
    }

    #[test]
    fn test_timeout_error() {
        let err = HeadlinerError::Timeout { timeout: 10 };
        assert!(err.to_string().contains("10"));
    }
}
