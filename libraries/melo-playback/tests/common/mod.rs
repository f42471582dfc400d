//! Shared fakes for controller tests

#![allow(dead_code)]

use async_trait::async_trait;
use melo_core::{PlayRecorder, Track, TracklistContext};
use melo_playback::{
    AudioDevice, AudioResource, PlaybackController, PlaybackError, PlaybackSession, Result,
    StatusReporter,
};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, Notify, Semaphore};

/// Call made against a fake resource, tagged with the url it was opened for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceCall {
    Play(String),
    Pause(String),
    Seek(String, u64),
    Unload(String),
}

/// Scripted audio device
///
/// In gated mode every `open` parks until [`FakeDevice::release`] hands out a
/// permit, which lets tests hold a load in flight.
#[derive(Default)]
pub struct FakeDevice {
    gate: Option<Arc<Semaphore>>,
    failing: Mutex<HashSet<String>>,
    opened: Mutex<Vec<String>>,
    reporters: Mutex<Vec<StatusReporter>>,
    calls: Arc<Mutex<Vec<DeviceCall>>>,
    entered: Notify,
}

impl FakeDevice {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn gated() -> Arc<Self> {
        Arc::new(Self {
            gate: Some(Arc::new(Semaphore::new(0))),
            ..Self::default()
        })
    }

    /// Make every open of `audio_url` fail
    pub fn fail_on(&self, audio_url: &str) {
        self.failing.lock().unwrap().insert(audio_url.to_string());
    }

    /// Let one parked `open` complete
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }

    /// Wait until some `open` has started
    pub async fn wait_entered(&self) {
        tokio::time::timeout(Duration::from_secs(2), self.entered.notified())
            .await
            .expect("device open was never entered");
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }

    pub fn calls(&self) -> Vec<DeviceCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Reporter handed to the most recent `open`
    pub fn last_reporter(&self) -> StatusReporter {
        self.reporters
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no resource was opened")
    }
}

#[async_trait]
impl AudioDevice for FakeDevice {
    async fn open(
        &self,
        audio_url: &str,
        reporter: StatusReporter,
    ) -> Result<Box<dyn AudioResource>> {
        self.opened.lock().unwrap().push(audio_url.to_string());
        self.reporters.lock().unwrap().push(reporter);
        self.entered.notify_one();

        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|e| PlaybackError::device(e.to_string()))?
                .forget();
        }

        if self.failing.lock().unwrap().contains(audio_url) {
            return Err(PlaybackError::device(format!("cannot open {}", audio_url)));
        }

        Ok(Box::new(FakeResource {
            url: audio_url.to_string(),
            calls: Arc::clone(&self.calls),
        }))
    }
}

struct FakeResource {
    url: String,
    calls: Arc<Mutex<Vec<DeviceCall>>>,
}

impl FakeResource {
    fn push(&self, call: DeviceCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl AudioResource for FakeResource {
    async fn play(&mut self) -> Result<()> {
        self.push(DeviceCall::Play(self.url.clone()));
        Ok(())
    }

    async fn pause(&mut self) -> Result<()> {
        self.push(DeviceCall::Pause(self.url.clone()));
        Ok(())
    }

    async fn set_position(&mut self, position_millis: u64) -> Result<()> {
        self.push(DeviceCall::Seek(self.url.clone(), position_millis));
        Ok(())
    }

    async fn unload(&mut self) -> Result<()> {
        self.push(DeviceCall::Unload(self.url.clone()));
        Ok(())
    }
}

/// Recorder forwarding every recorded track to a channel
pub struct RecordingRecorder {
    tx: mpsc::UnboundedSender<Track>,
}

impl RecordingRecorder {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<Track>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { tx }), rx)
    }
}

#[async_trait]
impl PlayRecorder for RecordingRecorder {
    async fn record(&self, track: Track) {
        let _ = self.tx.send(track);
    }
}

/// Recorder whose writes never complete
pub struct StalledRecorder;

#[async_trait]
impl PlayRecorder for StalledRecorder {
    async fn record(&self, _track: Track) {
        std::future::pending::<()>().await;
    }
}

pub fn create_test_track(id: &str) -> Track {
    Track::new(id, format!("Track {}", id), url(id))
}

pub fn url(id: &str) -> String {
    format!("https://cdn.test/{}.mp3", id)
}

pub fn album(ids: &[&str]) -> TracklistContext {
    TracklistContext::new(ids.iter().map(|id| create_test_track(id)).collect(), None)
}

pub fn current_id(session: &PlaybackSession) -> Option<String> {
    session
        .current_track
        .as_ref()
        .map(|t| t.id.as_str().to_string())
}

/// Poll the session until `predicate` holds
pub async fn wait_for_session<F>(controller: &PlaybackController, predicate: F) -> PlaybackSession
where
    F: Fn(&PlaybackSession) -> bool,
{
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            let session = controller.session().await;
            if predicate(&session) {
                return session;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("session never reached the expected state")
}
