//! Playback Events
//!
//! Event-based communication for UI synchronization during playback.
//! Events are recorded at key points:
//! - Status changes (loading/playing/paused/idle)
//! - Track changes
//! - Position updates reported by the device
//! - Queue edits and rejected additions
//! - Load failures and the natural end of a tracklist

use crate::types::PlaybackStatus;
use melo_core::TrackId;
use serde::{Deserialize, Serialize};

/// Events emitted by the playback controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    /// Playback status changed
    StateChanged {
        /// The new status
        status: PlaybackStatus,
    },

    /// A new track finished loading and became current
    TrackChanged {
        /// ID of the new (current) track
        track_id: TrackId,
        /// ID of the previous track (if any)
        previous_track_id: Option<TrackId>,
    },

    /// Position update from the device
    PositionUpdate {
        position_ms: u64,
        duration_ms: Option<u64>,
    },

    /// Queue changed (tracks added/removed/reordered/dequeued)
    QueueChanged {
        /// New queue length
        length: usize,
    },

    /// A track was not queued because it is already in the queue
    QueueAddRejected {
        track_id: TrackId,
    },

    /// None of the tracks of a bulk add were queued
    QueueAllDuplicate,

    /// A load failed; the session reverted to Idle
    LoadFailed {
        track_id: TrackId,
        message: String,
    },

    /// The tracklist ran out at the natural end of its last track
    EndOfList,

    /// The session was torn down (identity lost)
    TornDown,
}

/// Status notification sent by an audio resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceStatus {
    /// Periodic position report
    Progress {
        position_millis: u64,
        duration_millis: Option<u64>,
    },

    /// The resource played through to its end
    Finished,
}

/// Device status tagged with the generation of the load that created the
/// reporting resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusUpdate {
    pub generation: u64,
    pub status: DeviceStatus,
}
