//! Platform-agnostic audio device traits
//!
//! Abstracts the single audio-rendering resource so the controller works with
//! any backend (a native player, a streaming decoder, a simulation in tests).

use crate::error::Result;
use crate::events::{DeviceStatus, StatusUpdate};
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Factory for audio resources
#[async_trait]
pub trait AudioDevice: Send + Sync {
    /// Create a resource for `audio_url` and start playing it
    ///
    /// The resource must report its progress and its natural end through
    /// `reporter`. Reports may arrive on any task, at any time, including
    /// after the resource was unloaded.
    ///
    /// # Returns
    /// * `Ok(resource)` - Resource created and playing
    /// * `Err(_)` - The locator could not be opened or started
    async fn open(&self, audio_url: &str, reporter: StatusReporter)
        -> Result<Box<dyn AudioResource>>;
}

/// A loaded, playable audio resource
#[async_trait]
pub trait AudioResource: Send {
    /// Resume playback
    async fn play(&mut self) -> Result<()>;

    /// Pause playback
    async fn pause(&mut self) -> Result<()>;

    /// Reposition; the position is passed through unclamped
    async fn set_position(&mut self, position_millis: u64) -> Result<()>;

    /// Release the resource
    async fn unload(&mut self) -> Result<()>;
}

/// Channel handle given to a resource at creation
///
/// Every report is stamped with the generation of the load that created the
/// resource, so the controller can discard reports from replaced resources.
#[derive(Debug, Clone)]
pub struct StatusReporter {
    generation: u64,
    tx: mpsc::UnboundedSender<StatusUpdate>,
}

impl StatusReporter {
    pub(crate) fn new(generation: u64, tx: mpsc::UnboundedSender<StatusUpdate>) -> Self {
        Self { generation, tx }
    }

    /// Generation this reporter is bound to
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Send a status report
    ///
    /// Reports sent after the controller is gone are silently dropped.
    pub fn report(&self, status: DeviceStatus) {
        let _ = self.tx.send(StatusUpdate {
            generation: self.generation,
            status,
        });
    }

    /// Report a position update
    pub fn progress(&self, position_millis: u64, duration_millis: Option<u64>) {
        self.report(DeviceStatus::Progress {
            position_millis,
            duration_millis,
        });
    }

    /// Report that the resource played to its end
    pub fn finished(&self) {
        self.report(DeviceStatus::Finished);
    }
}
