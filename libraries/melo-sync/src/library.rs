//! Favorites / library mirror
//!
//! Each instance mirrors one (member set, ordering list) pair. Writes go to
//! the provider only; the local view changes solely when the provider pushes a
//! new snapshot, and is then rebuilt wholesale by a single reducer task.

use crate::error::Result;
use crate::snapshot::SnapshotPublisher;
use crate::store::PersistenceProvider;
use crate::types::{CollectionKind, Document, LibraryView};
use melo_core::{Track, TrackId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Synchronized favorites or library collection
pub struct LibrarySync {
    kind: CollectionKind,
    provider: Arc<dyn PersistenceProvider>,
    view_tx: Arc<SnapshotPublisher<LibraryView>>,
    view_rx: watch::Receiver<LibraryView>,
    reducer: JoinHandle<()>,
}

impl LibrarySync {
    /// Subscribe to both halves of `kind` and start the reducer
    ///
    /// Must be called inside a Tokio runtime.
    pub async fn start(kind: CollectionKind, provider: Arc<dyn PersistenceProvider>) -> Result<Self> {
        let mut members_rx = provider.subscribe_collection(kind.collection()).await?;
        let mut order_rx = provider.subscribe_order(kind.order_list()).await?;

        let initial = build_view(kind, &members_rx.borrow_and_update(), &order_rx.borrow_and_update());
        let (view_tx, view_rx) = SnapshotPublisher::new(initial);
        let view_tx = Arc::new(view_tx);

        let reducer = tokio::spawn(run_reducer(kind, members_rx, order_rx, Arc::clone(&view_tx)));

        info!(kind = ?kind, user = %provider.user_id(), "Library sync started");

        Ok(Self {
            kind,
            provider,
            view_tx,
            view_rx,
            reducer,
        })
    }

    pub fn kind(&self) -> CollectionKind {
        self.kind
    }

    /// Whether `id` is a member according to the last pushed snapshot
    ///
    /// Writes made through this instance are not visible here until the
    /// provider echoes them back.
    pub fn membership(&self, id: &TrackId) -> bool {
        self.view_rx.borrow().contains(id)
    }

    /// Add a track: upsert its snapshot, then union its id into the order
    ///
    /// The two writes are independent. If the second fails the track becomes
    /// a hidden member until the order converges.
    pub async fn add(&self, track: &Track) -> Result<()> {
        let collection = self.kind.collection();
        let data = serde_json::to_value(track)?;

        if let Err(e) = self.provider.upsert(collection, track.id.as_str(), data).await {
            warn!(kind = ?self.kind, track_id = %track.id, error = %e, "Member write failed");
            return Err(e);
        }

        if let Err(e) = self
            .provider
            .order_union(self.kind.order_list(), track.id.as_str())
            .await
        {
            warn!(kind = ?self.kind, track_id = %track.id, error = %e, "Order write failed");
            return Err(e);
        }

        debug!(kind = ?self.kind, track_id = %track.id, "Added");
        Ok(())
    }

    /// Remove a track: delete its snapshot, then drop its id from the order
    pub async fn remove(&self, id: &TrackId) -> Result<()> {
        if let Err(e) = self.provider.delete(self.kind.collection(), id.as_str()).await {
            warn!(kind = ?self.kind, track_id = %id, error = %e, "Member delete failed");
            return Err(e);
        }

        if let Err(e) = self
            .provider
            .order_remove(self.kind.order_list(), id.as_str())
            .await
        {
            warn!(kind = ?self.kind, track_id = %id, error = %e, "Order remove failed");
            return Err(e);
        }

        debug!(kind = ?self.kind, track_id = %id, "Removed");
        Ok(())
    }

    /// Overwrite the ordering list with a drag result
    pub async fn reorder(&self, ids: Vec<TrackId>) -> Result<()> {
        let ids = ids.into_iter().map(|id| id.as_str().to_string()).collect();
        self.provider
            .order_overwrite(self.kind.order_list(), ids)
            .await
            .map_err(|e| {
                warn!(kind = ?self.kind, error = %e, "Order overwrite failed");
                e
            })
    }

    /// Copy of the current view
    pub fn view(&self) -> LibraryView {
        self.view_rx.borrow().clone()
    }

    /// Receiver notified with every rebuilt view
    pub fn subscribe(&self) -> watch::Receiver<LibraryView> {
        self.view_rx.clone()
    }

    /// Members in display order
    pub fn ordered_tracks(&self) -> Vec<Track> {
        self.view_rx.borrow().ordered_tracks()
    }

    /// Member count
    pub fn len(&self) -> usize {
        self.view_rx.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.view_rx.borrow().is_empty()
    }

    /// Stop following the provider and empty the view
    pub fn close(&self) {
        self.reducer.abort();
        self.view_tx.close(LibraryView::default());
        debug!(kind = ?self.kind, "Library sync closed");
    }
}

impl Drop for LibrarySync {
    fn drop(&mut self) {
        self.reducer.abort();
    }
}

async fn run_reducer(
    kind: CollectionKind,
    mut members_rx: watch::Receiver<Vec<Document>>,
    mut order_rx: watch::Receiver<Vec<String>>,
    view_tx: Arc<SnapshotPublisher<LibraryView>>,
) {
    loop {
        tokio::select! {
            changed = members_rx.changed() => if changed.is_err() { break },
            changed = order_rx.changed() => if changed.is_err() { break },
        }

        let view = build_view(kind, &members_rx.borrow_and_update(), &order_rx.borrow_and_update());
        debug!(kind = ?kind, members = view.len(), ordered = view.order().len(), "Snapshot applied");
        if !view_tx.publish(view) {
            break;
        }
    }

    debug!(kind = ?kind, "Library subscription closed");
}

fn build_view(kind: CollectionKind, documents: &[Document], order: &[String]) -> LibraryView {
    let mut members = HashMap::with_capacity(documents.len());

    for document in documents {
        match serde_json::from_value::<Track>(document.data.clone()) {
            Ok(track) => {
                members.insert(TrackId::new(document.id.clone()), track);
            }
            Err(e) => {
                warn!(kind = ?kind, id = %document.id, error = %e, "Skipping malformed member");
            }
        }
    }

    let order = order.iter().map(|id| TrackId::new(id.clone())).collect();
    LibraryView::new(members, order)
}
