//! Error types for the access console.

use thiserror::Error;

/// Errors that can occur while talking to the access backend or loading
/// console configuration.
///
/// Controller handlers never surface these to their callers; they render
/// them into the feedback banner instead.
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// HTTP request failed before a response body could be read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the JSON we expected.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A form action or base URL could not be resolved.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid console configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}
