//! Error types for the asset API client

use thiserror::Error;

/// Errors that can occur when talking to the asset API
#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// API returned an error status
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message from server
        message: String,
    },

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// A search row lacks a required column
    #[error("search row {row} has no {field}")]
    MissingField {
        /// Zero-based position of the row in the search result
        row: usize,
        /// Name of the missing column
        field: &'static str,
    },
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;
