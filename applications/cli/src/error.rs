/// CLI error types
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Playback error: {0}")]
    Playback(#[from] melo_playback::PlaybackError),

    #[error("Album not available: {0}")]
    AlbumUnavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use melo_core::TrackId;
    use melo_playback::PlaybackError;

    #[test]
    fn load_failure_converts_with_context() {
        let err: CliError = PlaybackError::LoadFailure {
            track_id: TrackId::from("9"),
            reason: "unsupported locator".to_string(),
        }
        .into();

        assert!(matches!(err, CliError::Playback(_)));
        assert_eq!(
            err.to_string(),
            "Playback error: Failed to load track 9: unsupported locator"
        );
    }

    #[test]
    fn unavailable_album_names_the_page() {
        let err = CliError::AlbumUnavailable("https://site/album".to_string());
        assert_eq!(err.to_string(), "Album not available: https://site/album");
    }
}
