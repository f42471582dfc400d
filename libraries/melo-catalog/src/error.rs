//! Error types for the catalog client.

use thiserror::Error;

/// Errors that can occur when talking to the content provider.
///
/// These never leave the crate through the lenient public operations, which
/// log them and answer "no data" instead.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Provider returned an error response
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Invalid provider or album URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse provider response
    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;
