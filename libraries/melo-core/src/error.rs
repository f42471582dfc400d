/// Core error types for Melo
use thiserror::Error;

/// Result type alias using `MeloError`
pub type Result<T> = std::result::Result<T, MeloError>;

/// Core error type for Melo
#[derive(Error, Debug, PartialEq, Eq)]
pub enum MeloError {
    /// A track payload failed validation
    #[error("Invalid track: {0}")]
    InvalidTrack(String),
}

impl MeloError {
    /// Create an invalid track error
    pub fn invalid_track(msg: impl Into<String>) -> Self {
        Self::InvalidTrack(msg.into())
    }
}
