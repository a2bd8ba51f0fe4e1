//! Integration tests for the playback session
//!
//! Drives the session through the simulated device the way a host does:
//! call an operation, let the device settle, pump, check what the
//! surfaces would see.

use nada_core::{TrackId, TrackRef};
use nada_playback::{
    DeviceCall, DeviceEvent, MemoryStore, PlayAttemptId, PlayRejection, PlaybackConfig,
    PlaybackSession, SessionEvent, SessionState, SimulatedDevice, SimulatedDeviceHandle,
};

// ===== Test Helpers =====

type TestSession = PlaybackSession<SimulatedDevice, MemoryStore>;

fn create_test_track(id: &str) -> TrackRef {
    TrackRef::new(
        id,
        format!("Title {}", id),
        "Test Artist",
        format!("https://cdn.example/{}.mp3", id),
    )
}

fn create_tracks(ids: &[&str]) -> Vec<TrackRef> {
    ids.iter().map(|id| create_test_track(id)).collect()
}

fn create_session() -> (TestSession, SimulatedDeviceHandle) {
    let device = SimulatedDevice::new(180.0);
    let handle = device.handle();
    let session = PlaybackSession::new(PlaybackConfig::default(), device, MemoryStore::new());
    (session, handle)
}

fn source_of(id: &str) -> String {
    format!("https://cdn.example/{}.mp3", id)
}

// ===== Bounds & Atomic Replace =====

#[test]
fn set_queue_accepts_valid_index() {
    let (mut session, handle) = create_session();

    session.set_queue(create_tracks(&["a", "b", "c"]), 2);

    assert_eq!(session.current_index(), 2);
    assert_eq!(session.current_track().unwrap().id.as_str(), "c");
    assert_eq!(handle.source(), Some(source_of("c")));
}

#[test]
fn set_queue_clamps_index_past_end() {
    let (mut session, _handle) = create_session();

    session.set_queue(create_tracks(&["a", "b", "c"]), 99);

    assert_eq!(session.current_index(), 2);
    assert!(session.current_track().is_some());
}

#[test]
fn empty_queue_has_no_current_track_regardless_of_index() {
    let (mut session, _handle) = create_session();

    session.set_queue(Vec::new(), 5);

    assert!(session.current_track().is_none());
    assert_eq!(session.current_index(), 0);
    assert_eq!(session.state(), SessionState::Empty);
}

#[test]
fn replacing_a_long_queue_with_a_short_one_keeps_index_valid() {
    let (mut session, _handle) = create_session();
    session.set_queue(create_tracks(&["a", "b", "c", "d", "e"]), 4);
    session.pump();

    session.set_queue(create_tracks(&["x", "y"]), 4);

    assert_eq!(session.queue().len(), 2);
    assert_eq!(session.current_index(), 1);
    assert_eq!(session.current_track().unwrap().id.as_str(), "y");
}

// ===== Navigation =====

#[test]
fn prev_at_start_is_noop() {
    let (mut session, handle) = create_session();
    session.set_queue(create_tracks(&["a", "b"]), 0);
    session.pump();
    handle.clear_calls();
    session.drain_events();

    session.prev();

    assert_eq!(session.current_index(), 0);
    assert!(session.is_playing());
    assert!(handle.calls().is_empty());
    assert!(session.drain_events().is_empty());
}

#[test]
fn next_at_end_is_noop() {
    let (mut session, handle) = create_session();
    session.set_queue(create_tracks(&["a", "b"]), 1);
    session.pump();
    handle.clear_calls();

    session.next();

    assert_eq!(session.current_index(), 1);
    assert!(handle.calls().is_empty());
}

#[test]
fn jump_out_of_bounds_is_noop() {
    let (mut session, handle) = create_session();
    session.set_queue(create_tracks(&["a", "b"]), 0);
    handle.clear_calls();

    session.jump_to(2);
    session.jump_to(usize::MAX);

    assert_eq!(session.current_index(), 0);
    assert!(handle.calls().is_empty());
}

#[test]
fn next_and_prev_walk_the_queue() {
    let (mut session, handle) = create_session();
    session.set_queue(create_tracks(&["a", "b", "c"]), 0);

    session.next();
    session.next();
    session.prev();

    assert_eq!(session.current_index(), 1);
    assert_eq!(
        handle.loaded_sources(),
        vec![source_of("a"), source_of("b"), source_of("c"), source_of("b")]
    );
}

#[test]
fn navigation_flags_follow_index() {
    let (mut session, _handle) = create_session();
    assert!(!session.has_next());
    assert!(!session.has_prev());

    session.set_queue(create_tracks(&["a", "b", "c"]), 1);
    assert!(session.has_next());
    assert!(session.has_prev());

    session.jump_to(2);
    assert!(!session.has_next());
}

// ===== Auto-Advance =====

#[test]
fn ended_with_next_advances_and_reloads() {
    let (mut session, handle) = create_session();
    handle.set_duration(source_of("a"), 30.0);
    session.set_queue(create_tracks(&["a", "b"]), 0);
    session.pump();

    handle.advance(30.0);
    session.pump();

    assert_eq!(session.current_index(), 1);
    assert_eq!(handle.source(), Some(source_of("b")));
    assert!(session.is_playing());
    assert_eq!(session.duration(), 180.0);
}

#[test]
fn ended_without_next_stops_and_keeps_index() {
    let (mut session, handle) = create_session();
    session.set_queue(create_tracks(&["a", "b"]), 1);
    session.pump();

    handle.advance(500.0);
    session.pump();

    assert_eq!(session.current_index(), 1);
    assert_eq!(session.state(), SessionState::Paused);
    assert_eq!(session.elapsed(), session.duration());
}

#[test]
fn play_after_end_of_queue_restarts_track() {
    let (mut session, handle) = create_session();
    session.set_queue(create_tracks(&["a"]), 0);
    session.pump();
    handle.advance(180.0);
    session.pump();
    assert!(!session.is_playing());

    session.play();
    session.pump();

    assert!(session.is_playing());
    assert_eq!(session.elapsed(), 0.0);
}

#[test]
fn whole_queue_plays_through() {
    let (mut session, handle) = create_session();
    for id in ["a", "b", "c"] {
        handle.set_duration(source_of(id), 10.0);
    }
    session.set_queue(create_tracks(&["a", "b", "c"]), 0);
    session.pump();

    for _ in 0..3 {
        handle.advance(10.0);
        session.pump();
    }

    assert_eq!(session.current_index(), 2);
    assert_eq!(session.state(), SessionState::Paused);
    assert_eq!(handle.loaded_sources().len(), 3);
}

// ===== Track-Change Reset =====

#[test]
fn track_change_resets_progress_before_metadata() {
    let (mut session, handle) = create_session();
    session.set_queue(create_tracks(&["a", "b"]), 0);
    session.pump();
    handle.advance(37.0);
    session.pump();
    assert_eq!(session.elapsed(), 37.0);
    assert_eq!(session.duration(), 180.0);

    session.next();

    // Metadata for b is queued but not applied yet
    assert_eq!(session.elapsed(), 0.0);
    assert_eq!(session.duration(), 0.0);

    session.pump();
    assert_eq!(session.duration(), 180.0);
}

#[test]
fn progress_reset_is_reported_before_track_change() {
    let (mut session, handle) = create_session();
    session.set_queue(create_tracks(&["a", "b"]), 0);
    session.pump();
    handle.advance(37.0);
    session.pump();
    session.drain_events();

    session.next();
    let events = session.drain_events();

    let reset = events
        .iter()
        .position(|e| {
            *e == SessionEvent::Progress {
                elapsed: 0.0,
                duration: 0.0,
            }
        })
        .unwrap();
    let changed = events
        .iter()
        .position(|e| matches!(e, SessionEvent::TrackChanged { .. }))
        .unwrap();
    assert!(reset < changed);
}

// ===== Stale Event Guard =====

#[test]
fn late_success_for_previous_track_is_ignored() {
    let (mut session, handle) = create_session();
    handle.set_defer_play(true);

    session.set_queue(create_tracks(&["a", "b"]), 0);
    let attempt_a = PlayAttemptId::new(1);

    session.jump_to(1);
    assert!(session.is_play_pending());

    // The device refuses b, then a late success for a shows up
    handle.resolve_deferred(false);
    session.pump();
    session.handle_event(DeviceEvent::PlayResolved {
        attempt: attempt_a,
        result: Ok(()),
    });

    assert!(!session.is_playing());
    assert!(!handle.is_playing());
}

#[test]
fn late_failure_for_previous_track_is_ignored() {
    let (mut session, handle) = create_session();
    handle.set_defer_play(true);

    session.set_queue(create_tracks(&["a", "b"]), 0);
    session.jump_to(1);
    handle.resolve_deferred(true);
    session.pump();
    assert!(session.is_playing());

    session.handle_event(DeviceEvent::PlayResolved {
        attempt: PlayAttemptId::new(1),
        result: Err(PlayRejection::NotAllowed),
    });

    assert!(session.is_playing());
    assert!(handle.is_playing());
}

#[test]
fn abort_from_reload_does_not_touch_new_track() {
    let (mut session, handle) = create_session();
    handle.set_defer_play(true);

    session.set_queue(create_tracks(&["a", "b"]), 0);
    session.next();

    // Device aborted a's attempt when b was loaded; b is still pending
    session.pump();
    assert!(session.is_play_pending());

    handle.resolve_deferred(true);
    session.pump();
    assert!(session.is_playing());
}

#[test]
fn stale_ended_does_not_advance() {
    let (mut session, handle) = create_session();
    session.set_queue(create_tracks(&["a", "b", "c"]), 0);
    session.pump();
    let load_a = handle.current_load().unwrap();

    session.next();
    session.pump();
    session.handle_event(DeviceEvent::Ended { load: load_a });

    assert_eq!(session.current_index(), 1);
}

#[test]
fn stale_metadata_does_not_set_duration() {
    let (mut session, handle) = create_session();
    handle.break_source(source_of("b"));
    session.set_queue(create_tracks(&["a", "b"]), 0);
    let load_a = session.current_load().unwrap();

    session.next();
    session.pump();

    // a's metadata was still in the channel and must be dropped
    assert_eq!(session.duration(), 0.0);

    session.handle_event(DeviceEvent::MetadataLoaded {
        load: load_a,
        duration: 99.0,
    });
    assert_eq!(session.duration(), 0.0);
}

// ===== Transport =====

#[test]
fn blocked_autoplay_is_silent_and_user_play_retries() {
    let (mut session, handle) = create_session();
    handle.set_block_autoplay(true);

    session.set_queue(create_tracks(&["a"]), 0);
    session.pump();
    assert_eq!(session.state(), SessionState::Paused);

    handle.activate();
    session.toggle();
    session.pump();
    assert_eq!(session.state(), SessionState::Playing);
}

#[test]
fn late_resolution_of_replaced_attempt_is_ignored() {
    let (mut session, handle) = create_session();
    handle.set_defer_play(true);

    session.set_queue(create_tracks(&["a", "b"]), 0);
    let first = handle
        .calls()
        .iter()
        .find_map(|c| match c {
            DeviceCall::Play { attempt } => Some(*attempt),
            _ => None,
        })
        .unwrap();

    session.next();
    session.pump();
    assert!(session.is_play_pending());

    // The first promise settles only now, long after the track changed
    session.handle_event(DeviceEvent::PlayResolved {
        attempt: first,
        result: Ok(()),
    });
    assert!(session.is_play_pending());
    assert!(!session.is_playing());

    handle.resolve_deferred(true);
    session.pump();
    assert!(session.is_playing());
    assert_eq!(session.current_index(), 1);
}

#[test]
fn seek_keeps_play_state() {
    let (mut session, handle) = create_session();
    session.set_queue(create_tracks(&["a"]), 0);
    session.pump();
    session.pause();

    session.seek(90.0);

    assert_eq!(session.elapsed(), 90.0);
    assert_eq!(handle.position(), 90.0);
    assert_eq!(session.state(), SessionState::Paused);
}

#[test]
fn volume_survives_track_change() {
    let (mut session, handle) = create_session();
    session.set_volume(0.3);
    session.set_queue(create_tracks(&["a", "b"]), 0);
    session.next();

    assert_eq!(session.volume(), 0.3);
    assert_eq!(handle.volume(), 0.3);
}

#[test]
fn close_stops_device_and_empties_queue() {
    let (mut session, handle) = create_session();
    session.set_queue(create_tracks(&["a", "b"]), 1);
    session.pump();

    session.close();

    assert_eq!(session.state(), SessionState::Empty);
    assert!(!handle.is_playing());
    assert_eq!(handle.source(), None);
    let calls = handle.calls();
    assert!(calls.contains(&DeviceCall::Pause));
    assert!(calls.contains(&DeviceCall::Unload));

    // Transport calls are no-ops once closed
    handle.clear_calls();
    session.play();
    session.seek(3.0);
    assert!(handle.calls().is_empty());
}

#[test]
fn play_from_starts_at_selected_track() {
    let (mut session, handle) = create_session();

    session.play_from(create_tracks(&["a", "b", "c"]), &TrackId::new("c"));

    assert_eq!(session.current_index(), 2);
    assert_eq!(handle.source(), Some(source_of("c")));
}

// ===== Events =====

#[test]
fn events_describe_a_session() {
    let (mut session, _handle) = create_session();

    session.set_queue(create_tracks(&["a", "b"]), 0);
    session.pump();
    let events = session.drain_events();

    assert_eq!(events.first(), Some(&SessionEvent::QueueChanged { length: 2 }));
    assert!(events.contains(&SessionEvent::TrackChanged {
        index: 0,
        track_id: TrackId::new("a"),
        previous_track_id: None,
    }));
    assert!(events.contains(&SessionEvent::StateChanged {
        state: SessionState::Paused
    }));
    assert_eq!(
        events.last(),
        Some(&SessionEvent::StateChanged {
            state: SessionState::Playing
        })
    );
    assert!(!session.has_pending_events());
}

#[test]
fn close_reports_empty_state() {
    let (mut session, _handle) = create_session();
    session.set_queue(create_tracks(&["a"]), 0);
    session.pump();
    session.drain_events();

    session.close();

    assert_eq!(
        session.drain_events(),
        vec![
            SessionEvent::QueueChanged { length: 0 },
            SessionEvent::StateChanged {
                state: SessionState::Empty
            },
        ]
    );
}
