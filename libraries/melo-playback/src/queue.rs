//! User play queue
//!
//! FIFO of tracks the user explicitly asked to hear next. It takes priority
//! over the current tracklist when picking the next track.
//!
//! ```text
//! Currently Playing: Track A   (from album X)
//! ─────────────────────────────
//! Queue (play next, in order):
//!   - Track B (user added)
//!   - Track C (user added)
//! ─────────────────────────────
//! Album X continues after the queue drains
//! ```

use crate::types::{QueueAdd, QueueAddAll};
use melo_core::{Track, TrackId};
use std::collections::HashSet;

/// Ordered queue with no two entries sharing an id
#[derive(Debug, Clone, Default)]
pub struct QueueManager {
    tracks: Vec<Track>,
}

impl QueueManager {
    /// Create new empty queue
    pub fn new() -> Self {
        Self { tracks: Vec::new() }
    }

    /// Append a track unless one with the same id is already queued
    pub fn add(&mut self, track: Track) -> QueueAdd {
        if self.contains(&track.id) {
            return QueueAdd::Duplicate;
        }
        self.tracks.push(track);
        QueueAdd::Added
    }

    /// Append every track whose id is not queued yet
    ///
    /// Duplicates inside `tracks` itself are collapsed to their first
    /// occurrence so the no-duplicate invariant holds after the call.
    pub fn add_all(&mut self, tracks: Vec<Track>) -> QueueAddAll {
        let mut seen: HashSet<TrackId> = self.tracks.iter().map(|t| t.id.clone()).collect();
        let before = self.tracks.len();

        for track in tracks {
            if seen.insert(track.id.clone()) {
                self.tracks.push(track);
            }
        }

        match self.tracks.len() - before {
            0 => QueueAddAll::AllDuplicate,
            n => QueueAddAll::Added(n),
        }
    }

    /// Remove the entry with `id`, if present
    ///
    /// Returns whether anything was removed.
    pub fn remove(&mut self, id: &TrackId) -> bool {
        match self.tracks.iter().position(|t| &t.id == id) {
            Some(index) => {
                self.tracks.remove(index);
                true
            }
            None => false,
        }
    }

    /// Replace the queue with the result of a manual drag
    ///
    /// The new sequence is trusted as given; it is not checked against the
    /// previous contents.
    pub fn reorder(&mut self, tracks: Vec<Track>) {
        self.tracks = tracks;
    }

    /// Pop the first entry (`None` when the queue is empty)
    pub fn dequeue_head(&mut self) -> Option<Track> {
        if self.tracks.is_empty() {
            None
        } else {
            Some(self.tracks.remove(0))
        }
    }

    pub fn contains(&self, id: &TrackId) -> bool {
        self.tracks.iter().any(|t| &t.id == id)
    }

    /// Queued tracks in play order
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Clear entire queue
    pub fn clear(&mut self) {
        self.tracks.clear();
    }
}
