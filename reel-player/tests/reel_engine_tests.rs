//! Reel engine integration tests
//!
//! Drive a real `ReelEngine` task with a fake narration engine on a paused
//! tokio clock, so the auto-advance gap and icon window are exact.

mod helpers;

use std::time::Duration;

use helpers::{drain, reel_set, settle, EngineCall, FakeEngine};
use reel_common::{PlaybackState, ReelEvent};
use reel_player::config::PlayerConfig;
use reel_player::viewport::ViewportTracker;
use reel_player::{ReelEngine, ReelHandle, ReelView};
use tokio::task::JoinHandle;

fn start(fake: &FakeEngine) -> (ReelHandle, JoinHandle<()>) {
    ReelEngine::spawn(fake.clone(), &PlayerConfig::default())
}

#[tokio::test(start_paused = true)]
async fn test_initial_set_narrates_first_reel() {
    let fake = FakeEngine::new();
    let (handle, _task) = start(&fake);
    let mut events = handle.subscribe();

    handle.replace_reels(reel_set(3));
    settle().await;

    let view = handle.view();
    assert_eq!(view.active_index, Some(0));
    assert!(view.is_playing);
    assert_eq!(fake.spoken_texts(), vec!["Headline 0. Story 0".to_string()]);

    let events = drain(&mut events);
    assert!(matches!(events[0], ReelEvent::ReelSetLoaded { item_count: 3, .. }));
    assert!(events
        .iter()
        .any(|e| matches!(e, ReelEvent::ScrollRequested { index: 0, .. })));
    assert!(events.iter().any(|e| matches!(
        e,
        ReelEvent::NarrationStarted { index: 0, locale, .. } if locale == "en-US"
    )));
}

#[tokio::test(start_paused = true)]
async fn test_narration_end_advances_after_gap() {
    let fake = FakeEngine::new();
    let (handle, _task) = start(&fake);
    handle.replace_reels(reel_set(3));
    settle().await;

    assert!(fake.finish());
    settle().await;
    assert_eq!(handle.view().state, PlaybackState::Transitioning);
    assert_eq!(handle.view().active_index, Some(0));
    assert!(handle.view().is_playing);

    tokio::time::sleep(Duration::from_millis(990)).await;
    assert_eq!(fake.speak_count(), 1);

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(fake.speak_count(), 2);
    assert_eq!(handle.view().active_index, Some(1));
    assert_eq!(handle.view().state, PlaybackState::Speaking);
}

#[tokio::test(start_paused = true)]
async fn test_last_reel_wraps_to_first() {
    let fake = FakeEngine::new();
    let (handle, _task) = start(&fake);
    handle.replace_reels(reel_set(2));
    settle().await;

    for expected in [1, 0] {
        assert!(fake.finish());
        tokio::time::sleep(Duration::from_millis(1010)).await;
        assert_eq!(handle.view().active_index, Some(expected));
        assert!(handle.view().is_playing);
    }
    assert_eq!(fake.speak_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_single_reel_repeats() {
    let fake = FakeEngine::new();
    let (handle, _task) = start(&fake);
    handle.replace_reels(reel_set(1));
    settle().await;

    assert!(fake.finish());
    // The programmatic scroll settles on the same reel
    handle.on_scroll_to_index(0);
    tokio::time::sleep(Duration::from_millis(1010)).await;

    assert_eq!(fake.speak_count(), 2);
    assert_eq!(fake.spoken_texts()[1], "Headline 0. Story 0");
    assert_eq!(handle.view().active_index, Some(0));
    assert!(handle.view().is_playing);
}

#[tokio::test(start_paused = true)]
async fn test_manual_scroll_cancels_once_then_speaks() {
    let fake = FakeEngine::new();
    let (handle, _task) = start(&fake);
    handle.replace_reels(reel_set(4));
    settle().await;

    handle.on_scroll_to_index(2);
    settle().await;

    let calls = fake.calls();
    assert_eq!(calls.len(), 3);
    assert!(matches!(calls[0], EngineCall::Speak { .. }));
    assert_eq!(calls[1], EngineCall::Cancel);
    assert!(matches!(&calls[2], EngineCall::Speak { text, .. } if text == "Headline 2. Story 2"));
    assert_eq!(handle.view().active_index, Some(2));
}

#[tokio::test(start_paused = true)]
async fn test_manual_scroll_during_gap_wins_over_advance() {
    let fake = FakeEngine::new();
    let (handle, _task) = start(&fake);
    handle.replace_reels(reel_set(4));
    settle().await;

    assert!(fake.finish());
    settle().await;
    handle.on_scroll_to_index(3);
    tokio::time::sleep(Duration::from_secs(3)).await;

    assert_eq!(fake.speak_count(), 2);
    assert_eq!(handle.view().active_index, Some(3));
}

#[tokio::test(start_paused = true)]
async fn test_replacing_set_orphans_previous_narration() {
    let fake = FakeEngine::new();
    let (handle, _task) = start(&fake);
    handle.replace_reels(reel_set(3));
    settle().await;
    handle.on_scroll_to_index(2);
    settle().await;
    let old = fake.current().unwrap();

    handle.replace_reels(reel_set(5));
    settle().await;
    assert_eq!(handle.view().active_index, Some(0));

    fake.send_end(old);
    tokio::time::sleep(Duration::from_secs(3)).await;

    assert_eq!(handle.view().state, PlaybackState::Speaking);
    assert_eq!(handle.view().active_index, Some(0));
    assert_eq!(fake.speak_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_empty_set_never_touches_narration_or_timers() {
    let fake = FakeEngine::new();
    let (handle, _task) = start(&fake);
    let mut events = handle.subscribe();

    handle.replace_reels(reel_set(0));
    handle.toggle_play_pause();
    handle.on_scroll_to_index(0);
    tokio::time::sleep(Duration::from_secs(5)).await;

    assert!(fake.calls().is_empty());
    assert_eq!(handle.view(), ReelView::default());
    let events = drain(&mut events);
    assert!(events
        .iter()
        .any(|e| matches!(e, ReelEvent::NoNarratableContent { .. })));
    assert!(!events
        .iter()
        .any(|e| matches!(e, ReelEvent::IconVisibilityChanged { .. })));
}

#[tokio::test(start_paused = true)]
async fn test_pause_during_gap_prevents_advance() {
    let fake = FakeEngine::new();
    let (handle, _task) = start(&fake);
    handle.replace_reels(reel_set(3));
    settle().await;

    assert!(fake.finish());
    settle().await;
    handle.toggle_play_pause();
    tokio::time::sleep(Duration::from_secs(3)).await;

    assert_eq!(fake.speak_count(), 1);
    assert!(!handle.view().is_playing);

    handle.toggle_play_pause();
    settle().await;
    assert_eq!(fake.speak_count(), 2);
    assert!(handle.view().is_playing);
}

#[tokio::test(start_paused = true)]
async fn test_double_toggle_round_trip() {
    let fake = FakeEngine::new();
    let (handle, _task) = start(&fake);
    handle.replace_reels(reel_set(3));
    settle().await;
    handle.toggle_play_pause();
    settle().await;
    assert!(!handle.view().is_playing);
    let speaks_before = fake.speak_count();

    handle.toggle_play_pause();
    handle.toggle_play_pause();
    settle().await;

    assert!(!handle.view().is_playing);
    assert_eq!(handle.view().active_index, Some(0));
    assert_eq!(fake.speak_count() - speaks_before, 1);
}

#[tokio::test(start_paused = true)]
async fn test_icon_window_restarts_on_each_tap() {
    let fake = FakeEngine::new();
    let (handle, _task) = start(&fake);
    handle.replace_reels(reel_set(2));
    settle().await;

    handle.toggle_play_pause();
    settle().await;
    assert!(handle.view().is_icon_visible);

    tokio::time::sleep(Duration::from_millis(1000)).await;
    handle.toggle_play_pause();
    settle().await;

    // First window would have closed here
    tokio::time::sleep(Duration::from_millis(700)).await;
    assert!(handle.view().is_icon_visible);

    tokio::time::sleep(Duration::from_millis(900)).await;
    assert!(!handle.view().is_icon_visible);
}

#[tokio::test(start_paused = true)]
async fn test_unavailable_speech_stays_idle_without_retry() {
    let fake = FakeEngine::unavailable();
    let (handle, _task) = start(&fake);
    handle.replace_reels(reel_set(2));
    tokio::time::sleep(Duration::from_secs(5)).await;

    let view = handle.view();
    assert_eq!(view.active_index, Some(0));
    assert!(!view.is_playing);
    assert_eq!(fake.speak_attempts(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_dispose_stops_engine() {
    let fake = FakeEngine::new();
    let (handle, task) = start(&fake);
    let mut events = handle.subscribe();
    handle.replace_reels(reel_set(2));
    settle().await;

    handle.dispose();
    task.await.unwrap();

    assert_eq!(fake.cancel_count(), 1);
    assert!(fake.current().is_none());

    // Commands after disposal are dropped without panicking
    handle.toggle_play_pause();
    handle.replace_reels(reel_set(3));
    assert_eq!(fake.speak_count(), 1);

    let events = drain(&mut events);
    assert!(matches!(events.last(), Some(ReelEvent::Disposed { .. })));
}

#[tokio::test(start_paused = true)]
async fn test_dropping_all_handles_disposes() {
    let fake = FakeEngine::new();
    let (handle, task) = start(&fake);
    handle.replace_reels(reel_set(2));
    settle().await;

    drop(handle);
    task.await.unwrap();
    assert_eq!(fake.cancel_count(), 1);
}

/// Presentation layer honouring every scroll request it was sent
fn follow_scrolls(
    handle: &ReelHandle,
    tracker: &mut ViewportTracker,
    events: &mut tokio::sync::broadcast::Receiver<ReelEvent>,
) {
    for event in drain(events) {
        if let ReelEvent::ScrollRequested { index, .. } = event {
            let offset = tracker.offset_of(index).unwrap();
            if let Some(visible) = tracker.observe(offset) {
                handle.on_scroll_to_index(visible);
            }
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_viewport_echo_of_auto_scroll_is_a_confirmation() {
    let fake = FakeEngine::new();
    let (handle, _task) = start(&fake);
    let mut events = handle.subscribe();
    let mut tracker = ViewportTracker::uniform(3, 800.0, 800.0, 0.98);

    handle.replace_reels(reel_set(3));
    settle().await;
    follow_scrolls(&handle, &mut tracker, &mut events);
    settle().await;
    assert_eq!(tracker.reported(), Some(0));
    assert_eq!(fake.speak_count(), 1);

    assert!(fake.finish());
    settle().await;
    follow_scrolls(&handle, &mut tracker, &mut events);
    settle().await;

    assert_eq!(handle.view().state, PlaybackState::Transitioning);
    assert_eq!(fake.speak_count(), 1);

    tokio::time::sleep(Duration::from_millis(1010)).await;
    assert_eq!(fake.speak_count(), 2);
    assert_eq!(handle.view().active_index, Some(1));
    assert_eq!(tracker.reported(), Some(1));
}

#[tokio::test(start_paused = true)]
async fn test_watch_view_follows_every_change() {
    let fake = FakeEngine::new();
    let (handle, _task) = start(&fake);
    let mut views = handle.watch_view();

    handle.replace_reels(reel_set(2));
    views.changed().await.unwrap();
    let view = *views.borrow_and_update();
    assert_eq!(view.active_index, Some(0));
    assert!(view.is_playing);

    handle.toggle_play_pause();
    views.changed().await.unwrap();
    let view = *views.borrow_and_update();
    assert!(!view.is_playing);
    assert!(view.is_icon_visible);

    tokio::time::sleep(Duration::from_millis(1600)).await;
    assert!(views.has_changed().unwrap());
    assert!(!views.borrow_and_update().is_icon_visible);
}
