//! Playback controller - core orchestration
//!
//! Owns the single audio resource and coordinates the queue, the tracklist
//! navigator and the device.
//!
//! Loads are serialized through a guard that is held for the whole async
//! duration of a load: a load request arriving while another is in flight is
//! dropped, not queued. Lock order, when both are held, is resource before
//! state.

use crate::{
    device::{AudioDevice, AudioResource, StatusReporter},
    error::{PlaybackError, Result},
    events::{DeviceStatus, PlaybackEvent, StatusUpdate},
    queue::QueueManager,
    tracklist::{Step, TracklistNavigator},
    types::{
        ControlOutcome, LoadOutcome, PlaybackSession, PlaybackStatus, QueueAdd, QueueAddAll,
        SkipOutcome,
    },
};
use melo_core::{PlayRecorder, Track, TrackId, TracklistContext};
use std::sync::{Arc, Weak};
use tokio::sync::{mpsc, Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Central playback control
///
/// Cheap to clone; every clone drives the same session.
///
/// Must be created inside a Tokio runtime: construction spawns the task that
/// feeds device status reports into [`PlaybackController::handle_status`].
#[derive(Clone)]
pub struct PlaybackController {
    inner: Arc<Inner>,
}

struct Inner {
    device: Arc<dyn AudioDevice>,
    recorder: Arc<dyn PlayRecorder>,

    // Held for the full duration of a load
    load_guard: Mutex<()>,

    resource: Mutex<Option<Box<dyn AudioResource>>>,
    state: Mutex<State>,

    status_tx: mpsc::UnboundedSender<StatusUpdate>,
    pump: JoinHandle<()>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.pump.abort();
    }
}

#[derive(Default)]
struct State {
    session: PlaybackSession,
    queue: QueueManager,
    navigator: TracklistNavigator,

    // Event queue for UI synchronization
    events: Vec<PlaybackEvent>,
}

impl State {
    fn set_status(&mut self, status: PlaybackStatus) {
        if self.session.status != status {
            self.session.status = status;
            self.events.push(PlaybackEvent::StateChanged { status });
        }
    }

    fn reset_progress(&mut self) {
        self.session.position_millis = 0;
        self.session.duration_millis = None;
    }

    fn emit_queue_changed(&mut self) {
        let length = self.queue.len();
        self.events.push(PlaybackEvent::QueueChanged { length });
    }
}

enum Plan {
    Queue(Track),
    Context(Track, TracklistContext),
    Ended,
    Nothing,
}

impl PlaybackController {
    /// Create a controller driving `device` and notifying `recorder` of every
    /// successfully loaded track
    pub fn new(device: Arc<dyn AudioDevice>, recorder: Arc<dyn PlayRecorder>) -> Self {
        let (status_tx, status_rx) = mpsc::unbounded_channel();

        let inner = Arc::new_cyclic(|weak: &Weak<Inner>| Inner {
            device,
            recorder,
            load_guard: Mutex::new(()),
            resource: Mutex::new(None),
            state: Mutex::new(State::default()),
            status_tx,
            pump: tokio::spawn(run_status_pump(weak.clone(), status_rx)),
        });

        Self { inner }
    }

    // ===== Playback Control =====

    /// Load `track` and start playing it
    ///
    /// `context` becomes the new tracklist; without one the context is derived
    /// from the track's album page, or cleared.
    ///
    /// # Returns
    /// * `Ok(Loaded)` - Track is current and playing
    /// * `Ok(Dropped)` - Another load was in flight; nothing changed
    /// * `Ok(Abandoned)` - Session was torn down while loading
    /// * `Err(LoadFailure)` - Status reverted to Idle, current track unchanged
    pub async fn load(&self, track: Track, context: Option<TracklistContext>) -> Result<LoadOutcome> {
        let Ok(guard) = self.inner.load_guard.try_lock() else {
            debug!(track_id = %track.id, "Load already in flight, dropping request");
            return Ok(LoadOutcome::Dropped);
        };

        self.load_locked(guard, track, context).await
    }

    async fn load_locked(
        &self,
        _guard: MutexGuard<'_, ()>,
        track: Track,
        context: Option<TracklistContext>,
    ) -> Result<LoadOutcome> {
        let generation = {
            let mut state = self.inner.state.lock().await;
            state.session.generation += 1;
            state.set_status(PlaybackStatus::Loading);
            state.session.generation
        };

        info!(track_id = %track.id, generation, "Loading track");

        self.release_resource().await;

        let reporter = StatusReporter::new(generation, self.inner.status_tx.clone());
        let opened = self.inner.device.open(&track.audio_url, reporter).await;

        let mut slot = self.inner.resource.lock().await;
        let mut state = self.inner.state.lock().await;

        if state.session.generation != generation {
            drop(state);
            drop(slot);
            if let Ok(mut resource) = opened {
                if let Err(e) = resource.unload().await {
                    warn!(error = %e, "Failed to release resource of abandoned load");
                }
            }
            info!(track_id = %track.id, generation, "Session torn down during load");
            return Ok(LoadOutcome::Abandoned);
        }

        match opened {
            Ok(resource) => {
                *slot = Some(resource);
                drop(slot);

                let previous_track_id = state.session.current_track.as_ref().map(|t| t.id.clone());
                let context = context.or_else(|| TracklistContext::derived_from(&track));

                state.navigator.replace(context);
                state.session.current_track = Some(track.clone());
                state.reset_progress();
                state.set_status(PlaybackStatus::Playing);
                state.events.push(PlaybackEvent::TrackChanged {
                    track_id: track.id.clone(),
                    previous_track_id,
                });
                drop(state);

                let recorder = Arc::clone(&self.inner.recorder);
                tokio::spawn(async move {
                    recorder.record(track).await;
                });

                Ok(LoadOutcome::Loaded)
            }
            Err(e) => {
                drop(slot);
                let reason = e.to_string();
                error!(track_id = %track.id, error = %reason, "Failed to load track");

                state.reset_progress();
                state.set_status(PlaybackStatus::Idle);
                state.events.push(PlaybackEvent::LoadFailed {
                    track_id: track.id.clone(),
                    message: reason.clone(),
                });

                Err(PlaybackError::LoadFailure {
                    track_id: track.id,
                    reason,
                })
            }
        }
    }

    /// Toggle between Playing and Paused
    pub async fn play_pause(&self) -> Result<ControlOutcome> {
        let mut slot = self.inner.resource.lock().await;

        let (generation, playing) = {
            let state = self.inner.state.lock().await;
            if state.session.current_track.is_none()
                || state.session.status == PlaybackStatus::Loading
            {
                return Ok(ControlOutcome::Ignored);
            }
            (
                state.session.generation,
                state.session.status == PlaybackStatus::Playing,
            )
        };

        let Some(resource) = slot.as_mut() else {
            return Ok(ControlOutcome::Ignored);
        };

        let target = if playing {
            resource.pause().await?;
            PlaybackStatus::Paused
        } else {
            resource.play().await?;
            PlaybackStatus::Playing
        };
        drop(slot);

        let mut state = self.inner.state.lock().await;
        if state.session.generation == generation {
            state.set_status(target);
        }

        Ok(ControlOutcome::Applied)
    }

    /// Reposition the current track
    ///
    /// The position is not clamped to the track duration.
    pub async fn seek(&self, position_millis: u64) -> Result<ControlOutcome> {
        let mut slot = self.inner.resource.lock().await;

        let generation = {
            let state = self.inner.state.lock().await;
            if state.session.current_track.is_none()
                || state.session.status == PlaybackStatus::Loading
            {
                return Ok(ControlOutcome::Ignored);
            }
            state.session.generation
        };

        let Some(resource) = slot.as_mut() else {
            return Ok(ControlOutcome::Ignored);
        };

        resource.set_position(position_millis).await?;
        drop(slot);

        let mut state = self.inner.state.lock().await;
        if state.session.generation == generation {
            state.session.position_millis = position_millis;
        }

        Ok(ControlOutcome::Applied)
    }

    /// Skip to the next track
    ///
    /// The queue head wins over the tracklist. A queued track is played with a
    /// single-element context of its own. When the last track of the context
    /// ends naturally (`from_end_of_track`), the session goes idle.
    pub async fn next(&self, from_end_of_track: bool) -> Result<SkipOutcome> {
        let Ok(guard) = self.inner.load_guard.try_lock() else {
            debug!("Load in flight, ignoring next");
            return Ok(SkipOutcome::Ignored);
        };

        self.skip_forward(guard, from_end_of_track, None).await
    }

    /// Advance past the track whose resource of `generation` finished
    ///
    /// The generation is checked again once the load guard is held: a load
    /// that completed since the report was accepted makes it stale.
    async fn advance(&self, generation: u64) -> Result<SkipOutcome> {
        let Ok(guard) = self.inner.load_guard.try_lock() else {
            debug!(generation, "Load in flight, ignoring finished track");
            return Ok(SkipOutcome::Ignored);
        };

        self.skip_forward(guard, true, Some(generation)).await
    }

    async fn skip_forward(
        &self,
        guard: MutexGuard<'_, ()>,
        from_end_of_track: bool,
        expected_generation: Option<u64>,
    ) -> Result<SkipOutcome> {
        let plan = {
            let mut state = self.inner.state.lock().await;

            if let Some(expected) = expected_generation {
                if expected != state.session.generation {
                    debug!(
                        stale = expected,
                        current = state.session.generation,
                        "Discarding stale finished report"
                    );
                    return Ok(SkipOutcome::Ignored);
                }
            }

            if let Some(head) = state.queue.dequeue_head() {
                state.emit_queue_changed();
                Plan::Queue(head)
            } else if let Some(current_id) = current_id(&state) {
                match state.navigator.next(&current_id) {
                    Step::Track(track) => {
                        let context = state.navigator.context().cloned().unwrap_or_default();
                        Plan::Context(track, context)
                    }
                    Step::EndOfList if from_end_of_track => {
                        state.session.generation += 1;
                        state.session.current_track = None;
                        state.navigator.clear();
                        state.reset_progress();
                        state.set_status(PlaybackStatus::Idle);
                        state.events.push(PlaybackEvent::EndOfList);
                        Plan::Ended
                    }
                    Step::EndOfList | Step::NotInContext => Plan::Nothing,
                }
            } else {
                Plan::Nothing
            }
        };

        match plan {
            Plan::Queue(track) => {
                let context = TracklistContext::single(track.clone());
                let outcome = self.load_locked(guard, track, Some(context)).await?;
                Ok(SkipOutcome::FromQueue(outcome))
            }
            Plan::Context(track, context) => {
                let outcome = self.load_locked(guard, track, Some(context)).await?;
                Ok(SkipOutcome::FromContext(outcome))
            }
            Plan::Ended => {
                info!("Reached end of tracklist");
                self.release_resource().await;
                Ok(SkipOutcome::EndOfList)
            }
            Plan::Nothing => Ok(SkipOutcome::Ignored),
        }
    }

    /// Go back to the previous track of the current context
    ///
    /// The queue is never consulted.
    pub async fn previous(&self) -> Result<SkipOutcome> {
        let Ok(guard) = self.inner.load_guard.try_lock() else {
            debug!("Load in flight, ignoring previous");
            return Ok(SkipOutcome::Ignored);
        };

        let target = {
            let state = self.inner.state.lock().await;
            current_id(&state).and_then(|id| match state.navigator.previous(&id) {
                Step::Track(track) => {
                    let context = state.navigator.context().cloned().unwrap_or_default();
                    Some((track, context))
                }
                Step::EndOfList | Step::NotInContext => None,
            })
        };

        match target {
            Some((track, context)) => {
                let outcome = self.load_locked(guard, track, Some(context)).await?;
                Ok(SkipOutcome::FromContext(outcome))
            }
            None => Ok(SkipOutcome::Ignored),
        }
    }

    /// Apply a device status report
    ///
    /// Reports tagged with a generation other than the current one come from a
    /// replaced or released resource and are discarded. A "finished" report
    /// advances with `next(true)`.
    pub async fn handle_status(&self, update: StatusUpdate) {
        {
            let mut state = self.inner.state.lock().await;

            if update.generation != state.session.generation {
                debug!(
                    stale = update.generation,
                    current = state.session.generation,
                    "Discarding stale device status"
                );
                return;
            }

            match update.status {
                DeviceStatus::Progress {
                    position_millis,
                    duration_millis,
                } => {
                    state.session.position_millis = position_millis;
                    if duration_millis.is_some() {
                        state.session.duration_millis = duration_millis;
                    }
                    let duration_ms = state.session.duration_millis;
                    state.events.push(PlaybackEvent::PositionUpdate {
                        position_ms: position_millis,
                        duration_ms,
                    });
                    return;
                }
                DeviceStatus::Finished => {}
            }
        }

        debug!(generation = update.generation, "Track finished");
        if let Err(e) = self.advance(update.generation).await {
            warn!(error = %e, "Advancing after finished track failed");
        }
    }

    /// Stop everything and forget the session
    ///
    /// Releases the resource and clears the queue, the context and the current
    /// track. Runs regardless of any load in flight; such a load, and any
    /// status report still on its way, is ignored when it lands.
    pub async fn teardown(&self) {
        {
            let mut state = self.inner.state.lock().await;
            state.session.generation += 1;
            state.session.current_track = None;
            state.reset_progress();
            state.queue.clear();
            state.navigator.clear();
            state.set_status(PlaybackStatus::Idle);
            state.events.push(PlaybackEvent::TornDown);
        }

        self.release_resource().await;
        info!("Playback session torn down");
    }

    async fn release_resource(&self) {
        let previous = self.inner.resource.lock().await.take();
        if let Some(mut resource) = previous {
            if let Err(e) = resource.unload().await {
                warn!(error = %e, "Failed to release audio resource");
            }
        }
    }

    // ===== Queue =====

    /// Append a track to the play queue
    pub async fn enqueue(&self, track: Track) -> QueueAdd {
        let mut state = self.inner.state.lock().await;
        let track_id = track.id.clone();

        let result = state.queue.add(track);
        match result {
            QueueAdd::Added => state.emit_queue_changed(),
            QueueAdd::Duplicate => {
                debug!(track_id = %track_id, "Already in queue");
                state.events.push(PlaybackEvent::QueueAddRejected { track_id });
            }
        }
        result
    }

    /// Append every track not already queued
    pub async fn enqueue_all(&self, tracks: Vec<Track>) -> QueueAddAll {
        let mut state = self.inner.state.lock().await;

        let result = state.queue.add_all(tracks);
        match result {
            QueueAddAll::Added(_) => state.emit_queue_changed(),
            QueueAddAll::AllDuplicate => state.events.push(PlaybackEvent::QueueAllDuplicate),
        }
        result
    }

    /// Remove a queued track by id (no-op when absent)
    pub async fn remove_from_queue(&self, id: &TrackId) -> bool {
        let mut state = self.inner.state.lock().await;
        let removed = state.queue.remove(id);
        if removed {
            state.emit_queue_changed();
        }
        removed
    }

    /// Replace the queue with a reordered sequence
    pub async fn reorder_queue(&self, tracks: Vec<Track>) {
        let mut state = self.inner.state.lock().await;
        state.queue.reorder(tracks);
        state.emit_queue_changed();
    }

    // ===== State =====

    /// Copy of the current session
    pub async fn session(&self) -> PlaybackSession {
        self.inner.state.lock().await.session.clone()
    }

    /// Queued tracks in play order
    pub async fn queue(&self) -> Vec<Track> {
        self.inner.state.lock().await.queue.tracks().to_vec()
    }

    /// Current tracklist context
    pub async fn context(&self) -> Option<TracklistContext> {
        self.inner.state.lock().await.navigator.context().cloned()
    }

    /// Whether a load is in flight
    pub fn is_loading(&self) -> bool {
        self.inner.load_guard.try_lock().is_err()
    }

    // ===== Events =====

    /// Drain all pending events
    ///
    /// Returns all events that have been emitted since the last drain.
    pub async fn drain_events(&self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.inner.state.lock().await.events)
    }
}

fn current_id(state: &State) -> Option<TrackId> {
    state.session.current_track.as_ref().map(|t| t.id.clone())
}

async fn run_status_pump(weak: Weak<Inner>, mut rx: mpsc::UnboundedReceiver<StatusUpdate>) {
    while let Some(update) = rx.recv().await {
        let Some(inner) = weak.upgrade() else {
            break;
        };
        PlaybackController { inner }.handle_status(update).await;
    }
}
