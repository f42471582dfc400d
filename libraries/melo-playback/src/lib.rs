//! Melo - Playback Control
//!
//! Platform-agnostic playback control for Melo.
//!
//! This crate provides:
//! - A user play queue that never holds two entries with the same id
//! - Tracklist navigation (next/previous within an album or playlist)
//! - Serialized loading of a single audio resource
//! - Discarding of stale device callbacks via load generations
//! - Fire-and-forget play history notification
//!
//! # Architecture
//!
//! `melo-playback` knows nothing about audio decoding or persistence. The
//! audio backend is provided through [`AudioDevice`], and every successfully
//! loaded track is handed to a [`melo_core::PlayRecorder`].
//!
//! # Example
//!
//! ```rust,no_run
//! use melo_playback::{AudioDevice, AudioResource, PlaybackController, Result, StatusReporter};
//! use melo_core::{NoopRecorder, Track};
//! use std::sync::Arc;
//!
//! struct Silent;
//!
//! #[async_trait::async_trait]
//! impl AudioResource for Silent {
//!     async fn play(&mut self) -> Result<()> { Ok(()) }
//!     async fn pause(&mut self) -> Result<()> { Ok(()) }
//!     async fn set_position(&mut self, _ms: u64) -> Result<()> { Ok(()) }
//!     async fn unload(&mut self) -> Result<()> { Ok(()) }
//! }
//!
//! struct SilentDevice;
//!
//! #[async_trait::async_trait]
//! impl AudioDevice for SilentDevice {
//!     async fn open(&self, _url: &str, _reporter: StatusReporter) -> Result<Box<dyn AudioResource>> {
//!         Ok(Box::new(Silent))
//!     }
//! }
//!
//! # async fn run() -> Result<()> {
//! let controller = PlaybackController::new(Arc::new(SilentDevice), Arc::new(NoopRecorder));
//!
//! let track = Track::new(1u64, "Song", "https://cdn.example/1.mp3");
//! controller.load(track, None).await?;
//! controller.play_pause().await?;
//! controller.next(false).await?;
//! # Ok(())
//! # }
//! ```

mod controller;
mod device;
mod error;
mod events;
mod queue;
mod tracklist;
pub mod types;

// Public exports
pub use controller::PlaybackController;
pub use device::{AudioDevice, AudioResource, StatusReporter};
pub use error::{PlaybackError, Result};
pub use events::{DeviceStatus, PlaybackEvent, StatusUpdate};
pub use queue::QueueManager;
pub use tracklist::{Step, TracklistNavigator};
pub use types::{
    ControlOutcome, LoadOutcome, PlaybackSession, PlaybackStatus, QueueAdd, QueueAddAll,
    SkipOutcome,
};
