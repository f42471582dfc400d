//! Core types for playback management

use melo_core::Track;
use serde::{Deserialize, Serialize};

/// Playback status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlaybackStatus {
    /// Nothing playing
    #[default]
    Idle,

    /// A load is in flight
    Loading,

    /// Currently playing
    Playing,

    /// Paused mid-track
    Paused,
}

/// Snapshot of the playback session
///
/// Owned by `PlaybackController`; callers only ever see copies.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlaybackSession {
    /// Track currently loaded (at most one)
    pub current_track: Option<Track>,

    pub status: PlaybackStatus,

    /// Last position reported by the device
    pub position_millis: u64,

    /// Last duration reported by the device (unknown until the first report)
    pub duration_millis: Option<u64>,

    /// Incremented on every load and teardown; device callbacks carrying an
    /// older value are discarded
    pub generation: u64,
}

/// Result of a `load` request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Track loaded and playing
    Loaded,

    /// Another load was in flight; this request was dropped untouched
    Dropped,

    /// The session was torn down while the load was in flight
    Abandoned,
}

/// Result of a `next` / `previous` request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipOutcome {
    /// The queue head was dequeued and loaded
    FromQueue(LoadOutcome),

    /// The neighbouring track of the current context was loaded
    FromContext(LoadOutcome),

    /// The context ran out at the natural end of a track; the session is idle
    EndOfList,

    /// Nothing happened (load in flight, no current track, current track not
    /// in the context, or a manual skip past either end of the list)
    Ignored,
}

/// Result of `play_pause` / `seek`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlOutcome {
    /// Command was sent to the device
    Applied,

    /// No current track or a load in flight
    Ignored,
}

/// Result of adding a single track to the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueAdd {
    Added,

    /// A track with the same id is already queued
    Duplicate,
}

/// Result of adding several tracks to the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueAddAll {
    /// Number of tracks appended after dropping the ones already queued
    Added(usize),

    /// Every track was already queued
    AllDuplicate,
}
