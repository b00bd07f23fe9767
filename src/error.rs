// src/error.rs

//! Unified error handling for the data service.

use thiserror::Error;

/// Result type alias for data service operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// A source fetch failure, after the fallback has been exhausted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// No source could be reached (network error or non-2xx status)
    #[error("source unreachable: {0}")]
    Unreachable(String),

    /// The request exceeded the fetch timeout
    #[error("source timed out: {0}")]
    Timeout(String),

    /// The source rejected the configured credentials
    #[error("source authentication failed: {0}")]
    AuthFailed(String),
}

/// A parse failure over raw source content.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The content was empty or its root structure was missing
    #[error("malformed content: {0}")]
    MalformedContent(String),
}

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Source fetch failed across all configured sources
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Source content could not be parsed
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// The cache holds no snapshot and the cold-start refresh failed
    #[error("no data available yet: {0}")]
    EmptyCache(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an empty-cache error.
    pub fn empty_cache(message: impl Into<String>) -> Self {
        Self::EmptyCache(message.into())
    }
}
