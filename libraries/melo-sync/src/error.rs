use thiserror::Error;

/// Errors that can occur while talking to the persistence provider
#[derive(Error, Debug)]
pub enum SyncError {
    /// A remote write was rejected. The local cache is left alone and
    /// self-corrects on the next subscription push.
    #[error("Write to {target} rejected: {reason}")]
    WriteRejected { target: String, reason: String },

    #[error("Subscription to {0} could not be opened")]
    SubscriptionFailed(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SyncError {
    pub fn write_rejected(target: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::WriteRejected {
            target: target.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
