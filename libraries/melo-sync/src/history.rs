//! Play history
//!
//! One entry per track id, overwritten on every replay with a fresh server
//! timestamp, so replays refresh recency instead of adding duplicates.

use crate::error::Result;
use crate::snapshot::SnapshotPublisher;
use crate::store::{PersistenceProvider, LAST_HEARD_AT};
use crate::types::{Collection, Document, HistoryEntry};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use melo_core::{PlayRecorder, Track};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Records plays and mirrors the history collection, most recent first
pub struct HistoryRecorder {
    provider: Arc<dyn PersistenceProvider>,
    recent_tx: Arc<SnapshotPublisher<Vec<HistoryEntry>>>,
    recent_rx: watch::Receiver<Vec<HistoryEntry>>,
    reducer: JoinHandle<()>,
}

impl HistoryRecorder {
    /// Subscribe to the history collection and start the reducer
    pub async fn start(provider: Arc<dyn PersistenceProvider>) -> Result<Self> {
        let mut documents_rx = provider.subscribe_collection(Collection::History).await?;
        let initial = build_entries(&documents_rx.borrow_and_update());
        let (recent_tx, recent_rx) = SnapshotPublisher::new(initial);
        let recent_tx = Arc::new(recent_tx);

        let reducer = tokio::spawn({
            let recent_tx = Arc::clone(&recent_tx);
            async move {
                while documents_rx.changed().await.is_ok() {
                    let entries = build_entries(&documents_rx.borrow_and_update());
                    if !recent_tx.publish(entries) {
                        break;
                    }
                }
                debug!("History subscription closed");
            }
        });

        Ok(Self {
            provider,
            recent_tx,
            recent_rx,
            reducer,
        })
    }

    /// Upsert `track` with the current server time, reporting failures
    pub async fn try_record(&self, track: &Track) -> Result<()> {
        let data = serde_json::to_value(track)?;
        self.provider
            .upsert_stamped(Collection::History, track.id.as_str(), data, LAST_HEARD_AT)
            .await
    }

    /// The `n` most recently heard entries, newest first
    pub fn recent(&self, n: usize) -> Vec<HistoryEntry> {
        self.recent_rx.borrow().iter().take(n).cloned().collect()
    }

    /// Receiver over the full history, newest first
    pub fn subscribe_recent(&self) -> watch::Receiver<Vec<HistoryEntry>> {
        self.recent_rx.clone()
    }

    /// Stop following the provider and empty the cache
    pub fn close(&self) {
        self.reducer.abort();
        self.recent_tx.close(Vec::new());
    }
}

impl Drop for HistoryRecorder {
    fn drop(&mut self) {
        self.reducer.abort();
    }
}

#[async_trait]
impl PlayRecorder for HistoryRecorder {
    /// Failures are logged and swallowed; playback never waits on history
    async fn record(&self, track: Track) {
        match self.try_record(&track).await {
            Ok(()) => debug!(track_id = %track.id, "Play recorded"),
            Err(e) => warn!(track_id = %track.id, error = %e, "Failed to record play"),
        }
    }
}

fn build_entries(documents: &[Document]) -> Vec<HistoryEntry> {
    let mut entries: Vec<HistoryEntry> = documents
        .iter()
        .filter_map(|document| {
            let track = match serde_json::from_value::<Track>(document.data.clone()) {
                Ok(track) => track,
                Err(e) => {
                    warn!(id = %document.id, error = %e, "Skipping malformed history entry");
                    return None;
                }
            };
            // Entries whose server stamp has not resolved yet are left out
            let last_heard_at = document
                .data
                .get(LAST_HEARD_AT)
                .cloned()
                .and_then(|value| serde_json::from_value::<DateTime<Utc>>(value).ok())?;
            Some(HistoryEntry {
                track,
                last_heard_at,
            })
        })
        .collect();

    entries.sort_by(|a, b| b.last_heard_at.cmp(&a.last_heard_at));
    entries
}
