//! Error types for playback management

use melo_core::TrackId;
use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// The audio resource for a track could not be created or started.
    /// Recoverable: the session reverts to Idle.
    #[error("Failed to load track {track_id}: {reason}")]
    LoadFailure { track_id: TrackId, reason: String },

    /// A command to an already loaded resource failed
    #[error("Audio device error: {0}")]
    Device(String),
}

impl PlaybackError {
    /// Create a device error
    pub fn device(msg: impl Into<String>) -> Self {
        Self::Device(msg.into())
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
