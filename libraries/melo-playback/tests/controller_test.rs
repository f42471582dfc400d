//! Integration tests for PlaybackController
//!
//! Drives the controller against a scripted device and checks queue priority,
//! navigation, load serialization and stale-callback handling.

mod common;

use common::{
    album, create_test_track, current_id, url, wait_for_session, DeviceCall, FakeDevice,
    RecordingRecorder, StalledRecorder,
};
use melo_core::{NoopRecorder, TrackId};
use melo_playback::{
    ControlOutcome, DeviceStatus, LoadOutcome, PlaybackController, PlaybackError, PlaybackEvent,
    PlaybackStatus, QueueAdd, QueueAddAll, SkipOutcome, StatusUpdate,
};
use std::sync::Arc;
use std::time::Duration;

fn controller_with(device: &Arc<FakeDevice>) -> PlaybackController {
    PlaybackController::new(device.clone(), Arc::new(NoopRecorder))
}

// ============================================================================
// NAVIGATION
// ============================================================================

#[tokio::test]
async fn next_walks_context_then_goes_idle_at_natural_end() {
    let device = FakeDevice::new();
    let controller = controller_with(&device);
    let context = album(&["T1", "T2", "T3"]);

    controller
        .load(create_test_track("T2"), Some(context))
        .await
        .unwrap();

    let outcome = controller.next(false).await.unwrap();
    assert_eq!(outcome, SkipOutcome::FromContext(LoadOutcome::Loaded));
    assert_eq!(current_id(&controller.session().await).as_deref(), Some("T3"));

    let outcome = controller.next(true).await.unwrap();
    assert_eq!(outcome, SkipOutcome::EndOfList);

    let session = controller.session().await;
    assert_eq!(session.status, PlaybackStatus::Idle);
    assert!(session.current_track.is_none());
    assert!(controller.context().await.is_none());
    assert!(device.calls().contains(&DeviceCall::Unload(url("T3"))));
    assert!(controller
        .drain_events()
        .await
        .contains(&PlaybackEvent::EndOfList));
}

#[tokio::test]
async fn queue_wins_over_last_context_track() {
    let device = FakeDevice::new();
    let controller = controller_with(&device);

    controller
        .load(create_test_track("T3"), Some(album(&["T1", "T2", "T3"])))
        .await
        .unwrap();
    controller.enqueue(create_test_track("Q1")).await;

    let outcome = controller.next(false).await.unwrap();
    assert_eq!(outcome, SkipOutcome::FromQueue(LoadOutcome::Loaded));
    assert_eq!(current_id(&controller.session().await).as_deref(), Some("Q1"));
    assert!(controller.queue().await.is_empty());
}

#[tokio::test]
async fn queue_head_wins_mid_context() {
    let device = FakeDevice::new();
    let controller = controller_with(&device);

    controller
        .load(create_test_track("T1"), Some(album(&["T1", "T2", "T3"])))
        .await
        .unwrap();
    controller.enqueue(create_test_track("Q1")).await;
    controller.enqueue(create_test_track("Q2")).await;

    controller.next(false).await.unwrap();
    assert_eq!(current_id(&controller.session().await).as_deref(), Some("Q1"));

    controller.next(false).await.unwrap();
    assert_eq!(current_id(&controller.session().await).as_deref(), Some("Q2"));
    assert_eq!(device.opened(), vec![url("T1"), url("Q1"), url("Q2")]);
}

#[tokio::test]
async fn queued_track_plays_in_its_own_context() {
    let device = FakeDevice::new();
    let controller = controller_with(&device);

    controller
        .load(create_test_track("T1"), Some(album(&["T1", "T2"])))
        .await
        .unwrap();
    controller.enqueue(create_test_track("Q1")).await;
    controller.next(false).await.unwrap();

    let context = controller.context().await.unwrap();
    assert_eq!(context.len(), 1);
    assert_eq!(context.position(&TrackId::from("Q1")), Some(0));

    // The album is not resumed once the queue drains
    assert_eq!(controller.next(true).await.unwrap(), SkipOutcome::EndOfList);
}

#[tokio::test]
async fn manual_next_past_last_track_is_ignored() {
    let device = FakeDevice::new();
    let controller = controller_with(&device);

    controller
        .load(create_test_track("T3"), Some(album(&["T1", "T2", "T3"])))
        .await
        .unwrap();

    assert_eq!(controller.next(false).await.unwrap(), SkipOutcome::Ignored);

    let session = controller.session().await;
    assert_eq!(current_id(&session).as_deref(), Some("T3"));
    assert_eq!(session.status, PlaybackStatus::Playing);
}

#[tokio::test]
async fn next_without_current_track_is_ignored() {
    let device = FakeDevice::new();
    let controller = controller_with(&device);

    assert_eq!(controller.next(true).await.unwrap(), SkipOutcome::Ignored);
    assert!(device.opened().is_empty());
}

#[tokio::test]
async fn next_from_queue_without_current_track() {
    let device = FakeDevice::new();
    let controller = controller_with(&device);

    controller.enqueue(create_test_track("Q1")).await;
    assert_eq!(
        controller.next(false).await.unwrap(),
        SkipOutcome::FromQueue(LoadOutcome::Loaded)
    );
}

#[tokio::test]
async fn previous_then_next_restores_track() {
    let device = FakeDevice::new();
    let controller = controller_with(&device);

    controller
        .load(create_test_track("T2"), Some(album(&["T1", "T2", "T3"])))
        .await
        .unwrap();

    controller.next(false).await.unwrap();
    controller.previous().await.unwrap();
    assert_eq!(current_id(&controller.session().await).as_deref(), Some("T2"));

    controller.previous().await.unwrap();
    controller.next(false).await.unwrap();
    assert_eq!(current_id(&controller.session().await).as_deref(), Some("T2"));
}

#[tokio::test]
async fn previous_ignores_queue() {
    let device = FakeDevice::new();
    let controller = controller_with(&device);

    controller
        .load(create_test_track("T2"), Some(album(&["T1", "T2", "T3"])))
        .await
        .unwrap();
    controller.enqueue(create_test_track("Q1")).await;

    assert_eq!(
        controller.previous().await.unwrap(),
        SkipOutcome::FromContext(LoadOutcome::Loaded)
    );
    assert_eq!(current_id(&controller.session().await).as_deref(), Some("T1"));
    assert_eq!(controller.queue().await.len(), 1);
}

#[tokio::test]
async fn previous_at_first_track_is_ignored() {
    let device = FakeDevice::new();
    let controller = controller_with(&device);

    controller
        .load(create_test_track("T1"), Some(album(&["T1", "T2"])))
        .await
        .unwrap();

    assert_eq!(controller.previous().await.unwrap(), SkipOutcome::Ignored);
    assert_eq!(current_id(&controller.session().await).as_deref(), Some("T1"));
}

// ============================================================================
// LOAD SERIALIZATION
// ============================================================================

#[tokio::test]
async fn load_while_pending_is_dropped() {
    let device = FakeDevice::gated();
    let controller = controller_with(&device);

    let background = controller.clone();
    let first = tokio::spawn(async move { background.load(create_test_track("A"), None).await });

    device.wait_entered().await;
    assert!(controller.is_loading());
    assert_eq!(controller.session().await.status, PlaybackStatus::Loading);

    let second = controller.load(create_test_track("B"), None).await.unwrap();
    assert_eq!(second, LoadOutcome::Dropped);

    device.release();
    assert_eq!(first.await.unwrap().unwrap(), LoadOutcome::Loaded);

    let session = controller.session().await;
    assert_eq!(current_id(&session).as_deref(), Some("A"));
    assert_eq!(device.opened(), vec![url("A")]);
}

#[tokio::test]
async fn next_while_pending_keeps_queue() {
    let device = FakeDevice::gated();
    let controller = controller_with(&device);
    controller.enqueue(create_test_track("Q1")).await;

    let background = controller.clone();
    let first = tokio::spawn(async move { background.load(create_test_track("A"), None).await });
    device.wait_entered().await;

    assert_eq!(controller.next(false).await.unwrap(), SkipOutcome::Ignored);
    assert_eq!(controller.queue().await.len(), 1);

    device.release();
    first.await.unwrap().unwrap();
}

#[tokio::test]
async fn controls_are_ignored_while_loading() {
    let device = FakeDevice::gated();
    let controller = controller_with(&device);

    let background = controller.clone();
    let first = tokio::spawn(async move { background.load(create_test_track("A"), None).await });
    device.wait_entered().await;

    assert_eq!(controller.play_pause().await.unwrap(), ControlOutcome::Ignored);
    assert_eq!(controller.seek(1000).await.unwrap(), ControlOutcome::Ignored);

    device.release();
    first.await.unwrap().unwrap();
}

#[tokio::test]
async fn load_replaces_previous_resource() {
    let device = FakeDevice::new();
    let controller = controller_with(&device);

    controller.load(create_test_track("A"), None).await.unwrap();
    controller.load(create_test_track("B"), None).await.unwrap();

    assert_eq!(device.calls(), vec![DeviceCall::Unload(url("A"))]);
    assert_eq!(current_id(&controller.session().await).as_deref(), Some("B"));
}

#[tokio::test]
async fn failed_load_reverts_to_idle_and_keeps_current() {
    let device = FakeDevice::new();
    let controller = controller_with(&device);

    controller.load(create_test_track("A"), None).await.unwrap();
    controller.drain_events().await;

    device.fail_on(&url("B"));
    let result = controller.load(create_test_track("B"), None).await;
    assert!(matches!(
        result,
        Err(PlaybackError::LoadFailure { ref track_id, .. }) if track_id.as_str() == "B"
    ));

    let session = controller.session().await;
    assert_eq!(session.status, PlaybackStatus::Idle);
    assert_eq!(current_id(&session).as_deref(), Some("A"));

    let events = controller.drain_events().await;
    assert!(events
        .iter()
        .any(|e| matches!(e, PlaybackEvent::LoadFailed { track_id, .. } if track_id.as_str() == "B")));

    // Guard was released; the next load goes through
    assert_eq!(
        controller.load(create_test_track("C"), None).await.unwrap(),
        LoadOutcome::Loaded
    );
}

// ============================================================================
// DEVICE CALLBACKS
// ============================================================================

#[tokio::test]
async fn progress_updates_position() {
    let device = FakeDevice::new();
    let controller = controller_with(&device);

    controller.load(create_test_track("A"), None).await.unwrap();
    device.last_reporter().progress(12_000, Some(180_000));

    let session = wait_for_session(&controller, |s| s.position_millis == 12_000).await;
    assert_eq!(session.duration_millis, Some(180_000));
}

#[tokio::test]
async fn finished_advances_to_next_track() {
    let device = FakeDevice::new();
    let controller = controller_with(&device);

    controller
        .load(create_test_track("T1"), Some(album(&["T1", "T2"])))
        .await
        .unwrap();
    device.last_reporter().finished();

    let session = wait_for_session(&controller, |s| current_id(s).as_deref() == Some("T2")).await;
    assert_eq!(session.status, PlaybackStatus::Playing);
}

#[tokio::test]
async fn finished_last_track_goes_idle() {
    let device = FakeDevice::new();
    let controller = controller_with(&device);

    controller
        .load(create_test_track("T2"), Some(album(&["T1", "T2"])))
        .await
        .unwrap();
    device.last_reporter().finished();

    wait_for_session(&controller, |s| {
        s.status == PlaybackStatus::Idle && s.current_track.is_none()
    })
    .await;
}

#[tokio::test]
async fn stale_reports_are_discarded() {
    let device = FakeDevice::new();
    let controller = controller_with(&device);

    controller
        .load(create_test_track("A"), Some(album(&["A", "B", "C"])))
        .await
        .unwrap();
    let stale = device.last_reporter();

    controller.load(create_test_track("B"), None).await.unwrap();
    let fresh = device.last_reporter();

    stale.finished();
    stale.progress(99_000, None);
    fresh.progress(3_000, None);

    let session = wait_for_session(&controller, |s| s.position_millis == 3_000).await;
    assert_eq!(current_id(&session).as_deref(), Some("B"));
    assert_eq!(device.opened(), vec![url("A"), url("B")]);
}

#[tokio::test]
async fn handle_status_ignores_older_generation() {
    let device = FakeDevice::new();
    let controller = controller_with(&device);

    controller
        .load(create_test_track("T1"), Some(album(&["T1", "T2"])))
        .await
        .unwrap();
    let generation = controller.session().await.generation;

    controller
        .handle_status(StatusUpdate {
            generation: generation - 1,
            status: DeviceStatus::Finished,
        })
        .await;

    assert_eq!(current_id(&controller.session().await).as_deref(), Some("T1"));
}

// ============================================================================
// CONTROLS
// ============================================================================

#[tokio::test]
async fn play_pause_toggles() {
    let device = FakeDevice::new();
    let controller = controller_with(&device);

    assert_eq!(controller.play_pause().await.unwrap(), ControlOutcome::Ignored);

    controller.load(create_test_track("A"), None).await.unwrap();

    assert_eq!(controller.play_pause().await.unwrap(), ControlOutcome::Applied);
    assert_eq!(controller.session().await.status, PlaybackStatus::Paused);

    assert_eq!(controller.play_pause().await.unwrap(), ControlOutcome::Applied);
    assert_eq!(controller.session().await.status, PlaybackStatus::Playing);

    assert_eq!(
        device.calls(),
        vec![DeviceCall::Pause(url("A")), DeviceCall::Play(url("A"))]
    );
}

#[tokio::test]
async fn seek_is_unclamped() {
    let device = FakeDevice::new();
    let controller = controller_with(&device);

    assert_eq!(controller.seek(5_000).await.unwrap(), ControlOutcome::Ignored);

    controller.load(create_test_track("A"), None).await.unwrap();
    device.last_reporter().progress(0, Some(10_000));
    wait_for_session(&controller, |s| s.duration_millis == Some(10_000)).await;

    assert_eq!(controller.seek(60_000).await.unwrap(), ControlOutcome::Applied);
    assert_eq!(controller.session().await.position_millis, 60_000);
    assert!(device.calls().contains(&DeviceCall::Seek(url("A"), 60_000)));
}

// ============================================================================
// TEARDOWN
// ============================================================================

#[tokio::test]
async fn teardown_clears_everything() {
    let device = FakeDevice::new();
    let controller = controller_with(&device);

    controller
        .load(create_test_track("T1"), Some(album(&["T1", "T2"])))
        .await
        .unwrap();
    controller.enqueue(create_test_track("Q1")).await;

    controller.teardown().await;

    let session = controller.session().await;
    assert_eq!(session.status, PlaybackStatus::Idle);
    assert!(session.current_track.is_none());
    assert!(controller.queue().await.is_empty());
    assert!(controller.context().await.is_none());
    assert!(device.calls().contains(&DeviceCall::Unload(url("T1"))));
    assert!(controller
        .drain_events()
        .await
        .contains(&PlaybackEvent::TornDown));
}

#[tokio::test]
async fn teardown_during_load_abandons_it() {
    let device = FakeDevice::gated();
    let controller = controller_with(&device);

    let background = controller.clone();
    let pending = tokio::spawn(async move { background.load(create_test_track("A"), None).await });
    device.wait_entered().await;

    controller.teardown().await;
    device.release();

    assert_eq!(pending.await.unwrap().unwrap(), LoadOutcome::Abandoned);

    let session = controller.session().await;
    assert!(session.current_track.is_none());
    assert_eq!(session.status, PlaybackStatus::Idle);
    assert!(device.calls().contains(&DeviceCall::Unload(url("A"))));
}

#[tokio::test]
async fn reports_after_teardown_are_ignored() {
    let device = FakeDevice::new();
    let controller = controller_with(&device);

    controller
        .load(create_test_track("T1"), Some(album(&["T1", "T2"])))
        .await
        .unwrap();
    let reporter = device.last_reporter();

    controller.teardown().await;
    reporter.finished();

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(controller.session().await.current_track.is_none());
    assert_eq!(device.opened(), vec![url("T1")]);
}

// ============================================================================
// QUEUE
// ============================================================================

#[tokio::test]
async fn enqueue_rejects_duplicates() {
    let device = FakeDevice::new();
    let controller = controller_with(&device);

    assert_eq!(controller.enqueue(create_test_track("1")).await, QueueAdd::Added);
    assert_eq!(
        controller.enqueue(create_test_track("1")).await,
        QueueAdd::Duplicate
    );
    assert_eq!(
        controller
            .enqueue_all(vec![create_test_track("1"), create_test_track("2")])
            .await,
        QueueAddAll::Added(1)
    );
    assert_eq!(
        controller
            .enqueue_all(vec![create_test_track("2"), create_test_track("1")])
            .await,
        QueueAddAll::AllDuplicate
    );

    let events = controller.drain_events().await;
    assert!(events.contains(&PlaybackEvent::QueueAllDuplicate));
}

#[tokio::test]
async fn remove_and_reorder_queue() {
    let device = FakeDevice::new();
    let controller = controller_with(&device);

    controller
        .enqueue_all(vec![
            create_test_track("1"),
            create_test_track("2"),
            create_test_track("3"),
        ])
        .await;

    assert!(controller.remove_from_queue(&TrackId::from("2")).await);
    assert!(!controller.remove_from_queue(&TrackId::from("2")).await);

    controller
        .reorder_queue(vec![create_test_track("3"), create_test_track("1")])
        .await;

    let ids: Vec<String> = controller
        .queue()
        .await
        .iter()
        .map(|t| t.id.as_str().to_string())
        .collect();
    assert_eq!(ids, vec!["3", "1"]);
}

// ============================================================================
// HISTORY NOTIFICATION
// ============================================================================

#[tokio::test]
async fn recorder_sees_each_loaded_track() {
    let device = FakeDevice::new();
    let (recorder, mut recorded) = RecordingRecorder::new();
    let controller = PlaybackController::new(device.clone(), recorder);

    device.fail_on(&url("B"));
    controller.load(create_test_track("A"), None).await.unwrap();
    let _ = controller.load(create_test_track("B"), None).await;
    controller.load(create_test_track("C"), None).await.unwrap();

    let first = recorded.recv().await.unwrap();
    let second = recorded.recv().await.unwrap();
    assert_eq!(first.id.as_str(), "A");
    assert_eq!(second.id.as_str(), "C");
}

#[tokio::test]
async fn stalled_recorder_does_not_block_playback() {
    let device = FakeDevice::new();
    let controller = PlaybackController::new(device.clone(), Arc::new(StalledRecorder));

    let outcome = tokio::time::timeout(
        Duration::from_secs(1),
        controller.load(create_test_track("A"), None),
    )
    .await
    .expect("load waited on the recorder")
    .unwrap();

    assert_eq!(outcome, LoadOutcome::Loaded);
}
