use thiserror::Error;

/// Errors raised while opening a user session
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Sync error: {0}")]
    Sync(#[from] melo_sync::SyncError),
}

pub type Result<T> = std::result::Result<T, SessionError>;
