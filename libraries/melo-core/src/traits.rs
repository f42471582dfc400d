/// Core traits for Melo
use crate::types::Track;
use async_trait::async_trait;
use std::sync::Arc;

/// Receiver of "this track started playing" notifications
///
/// Playback fires this without waiting for it. Implementations must settle
/// every failure themselves (log it, drop it); nothing may propagate back into
/// the playback path.
#[async_trait]
pub trait PlayRecorder: Send + Sync {
    /// Note that `track` was just loaded and started
    async fn record(&self, track: Track);
}

/// Recorder that discards everything (used when no user is signed in)
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRecorder;

#[async_trait]
impl PlayRecorder for NoopRecorder {
    async fn record(&self, _track: Track) {}
}

#[async_trait]
impl<T: PlayRecorder + ?Sized> PlayRecorder for Arc<T> {
    async fn record(&self, track: Track) {
        (**self).record(track).await;
    }
}
