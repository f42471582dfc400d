//! Simulated audio output
//!
//! Stands in for a real player: every opened resource advances a playhead on
//! a Tokio timer, reports progress and reports the natural end of the track.

use async_trait::async_trait;
use melo_playback::{AudioDevice, AudioResource, PlaybackError, Result, StatusReporter};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

/// Device whose every track lasts `track_length`
#[derive(Debug, Clone)]
pub struct SimulatedDevice {
    track_length: Duration,
    tick: Duration,
}

impl SimulatedDevice {
    pub fn new(track_length: Duration, tick: Duration) -> Self {
        Self { track_length, tick }
    }
}

#[derive(Debug, Default)]
struct Playhead {
    position_millis: u64,
    paused: bool,
}

struct SimulatedResource {
    audio_url: String,
    playhead: Arc<Mutex<Playhead>>,
    clock: JoinHandle<()>,
}

fn lock(playhead: &Mutex<Playhead>) -> MutexGuard<'_, Playhead> {
    playhead.lock().unwrap_or_else(PoisonError::into_inner)
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

async fn run_clock(playhead: Arc<Mutex<Playhead>>, reporter: StatusReporter, tick: Duration, length: u64) {
    let step = millis(tick).max(1);
    let mut interval = tokio::time::interval(tick);

    // First tick completes immediately
    interval.tick().await;

    loop {
        interval.tick().await;

        let position = {
            let mut head = lock(&playhead);
            if head.paused {
                continue;
            }
            head.position_millis = head.position_millis.saturating_add(step).min(length);
            head.position_millis
        };

        reporter.progress(position, Some(length));
        if position >= length {
            reporter.finished();
            break;
        }
    }
}

#[async_trait]
impl AudioDevice for SimulatedDevice {
    async fn open(
        &self,
        audio_url: &str,
        reporter: StatusReporter,
    ) -> Result<Box<dyn AudioResource>> {
        if !audio_url.starts_with("http://") && !audio_url.starts_with("https://") {
            return Err(PlaybackError::device(format!(
                "unsupported locator {}",
                audio_url
            )));
        }

        debug!(audio_url, generation = reporter.generation(), "Opening simulated resource");

        let playhead = Arc::new(Mutex::new(Playhead::default()));
        let clock = tokio::spawn(run_clock(
            Arc::clone(&playhead),
            reporter,
            self.tick,
            millis(self.track_length),
        ));

        Ok(Box::new(SimulatedResource {
            audio_url: audio_url.to_string(),
            playhead,
            clock,
        }))
    }
}

#[async_trait]
impl AudioResource for SimulatedResource {
    async fn play(&mut self) -> Result<()> {
        lock(&self.playhead).paused = false;
        Ok(())
    }

    async fn pause(&mut self) -> Result<()> {
        lock(&self.playhead).paused = true;
        Ok(())
    }

    async fn set_position(&mut self, position_millis: u64) -> Result<()> {
        lock(&self.playhead).position_millis = position_millis;
        Ok(())
    }

    async fn unload(&mut self) -> Result<()> {
        self.clock.abort();
        debug!(audio_url = %self.audio_url, "Simulated resource released");
        Ok(())
    }
}

impl Drop for SimulatedResource {
    fn drop(&mut self) {
        self.clock.abort();
    }
}
