use std::fs;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::*;
use crate::player::stub::StubBackend;
use crate::player::{PlaybackEngine, PlayerState};
use crate::store::{MusicStore, TrackInfo};

fn track_info(path: &str, title: &str) -> TrackInfo {
    let mut info = TrackInfo::empty(path.into());
    info.title = title.to_string();
    info.artist = "Artist".to_string();
    info
}

/// In-memory store with two tracks, and a session over a stub backend.
fn session_with_two_tracks(fade_secs: f32, tick_rate: u32) -> (Session, i64, i64) {
    let store = Arc::new(MusicStore::open_in_memory().unwrap());
    let first = store.upsert(&track_info("/m/one.mp3", "One")).unwrap();
    let second = store.upsert(&track_info("/m/two.mp3", "Two")).unwrap();

    let (backend, _) = StubBackend::new();
    let engine = PlaybackEngine::new(Box::new(backend), fade_secs, tick_rate);
    (Session::new(store, engine), first, second)
}

#[test]
fn play_enqueue_next_previous_round_trip() {
    let (mut session, first, second) = session_with_two_tracks(0.0, 10);

    session.play_track(first).unwrap();
    assert_eq!(session.player_state(), PlayerState::Playing);
    assert_eq!(session.queue().current().unwrap().track_id, first);

    session.enqueue(second).unwrap();
    assert_eq!(session.next().unwrap(), Some(second));
    assert_eq!(session.queue().current().unwrap().track_id, second);

    assert_eq!(session.previous().unwrap(), Some(first));
    assert_eq!(session.queue().pending_ids(), vec![second]);
    assert_eq!(session.player_state(), PlayerState::Playing);

    // Every start counts as a play: once via play_track, once via previous.
    let track = session.store().track_by_id(first).unwrap().unwrap();
    assert_eq!(track.play_count, 2);
}

#[test]
fn failed_next_keeps_queue_position() {
    let (mut session, first, _) = session_with_two_tracks(0.0, 10);
    let bad = session
        .store()
        .upsert(&track_info("/m/missing.mp3", "Gone"))
        .unwrap();
    session.play_track(first).unwrap();
    session.enqueue(bad).unwrap();

    assert!(matches!(session.next(), Err(SessionError::Media(_))));
    // The unplayable entry stays pending and current is unchanged; only the
    // engine rolled back.
    assert_eq!(session.queue().current().unwrap().track_id, first);
    assert_eq!(session.queue().pending_ids(), vec![bad]);
    assert_eq!(session.player_state(), PlayerState::Empty);

    let track = session.store().track_by_id(bad).unwrap().unwrap();
    assert_eq!(track.play_count, 0);
}

#[test]
fn next_past_end_of_queue_stops_playback() {
    let (mut session, first, _) = session_with_two_tracks(0.0, 10);
    session.play_track(first).unwrap();

    assert_eq!(session.next().unwrap(), None);
    assert_eq!(session.player_state(), PlayerState::Empty);
    assert!(session.queue().current().is_none());
}

#[test]
fn play_track_bumps_play_count() {
    let (mut session, first, _) = session_with_two_tracks(0.0, 10);
    session.play_track(first).unwrap();
    session.play_track(first).unwrap();

    let track = session.store().track_by_id(first).unwrap().unwrap();
    assert_eq!(track.play_count, 2);
}

#[test]
fn unknown_track_id_is_an_error() {
    let (mut session, _, _) = session_with_two_tracks(0.0, 10);
    assert!(matches!(
        session.play_track(9999),
        Err(SessionError::UnknownTrack(9999))
    ));
    assert!(matches!(
        session.enqueue(9999),
        Err(SessionError::UnknownTrack(9999))
    ));
}

#[test]
fn failed_load_leaves_queue_and_engine_untouched() {
    let (mut session, _, _) = session_with_two_tracks(0.0, 10);
    let bad = session
        .store()
        .upsert(&track_info("/m/missing.mp3", "Gone"))
        .unwrap();

    assert!(matches!(
        session.play_track(bad),
        Err(SessionError::Media(_))
    ));
    assert_eq!(session.player_state(), PlayerState::Empty);
    assert!(session.queue().is_empty());

    let track = session.store().track_by_id(bad).unwrap().unwrap();
    assert_eq!(track.play_count, 0);
}

#[test]
fn toggle_pause_cycles_playing_and_paused() {
    let (mut session, first, _) = session_with_two_tracks(0.0, 10);
    session.play_track(first).unwrap();

    session.toggle_pause();
    assert_eq!(session.player_state(), PlayerState::Paused);
    session.toggle_pause();
    assert_eq!(session.player_state(), PlayerState::Playing);

    // No-op with nothing loaded.
    session.stop();
    session.toggle_pause();
    assert_eq!(session.player_state(), PlayerState::Empty);
}

#[test]
fn sleep_timer_stop_fires_once_through_tick() {
    let (mut session, first, _) = session_with_two_tracks(0.0, 10);
    session.play_track(first).unwrap();
    session.start_sleep_timer(0, SleepAction::Stop);

    let now = Instant::now();
    session.tick(now);
    assert_eq!(session.player_state(), PlayerState::Empty);
    assert_eq!(session.sleep_remaining(now), 0);

    // Expired timer leaves no residue on later ticks.
    session.play_track(first).unwrap();
    session.tick(now + Duration::from_secs(3600));
    assert_eq!(session.player_state(), PlayerState::Playing);
}

#[test]
fn sleep_timer_fade_then_stop_ramps_down_to_empty() {
    // 0.5s fade at 2 ticks/sec = one ramp step.
    let (mut session, first, _) = session_with_two_tracks(0.5, 2);
    session.play_track(first).unwrap();
    session.start_sleep_timer(0, SleepAction::FadeThenStop);

    let now = Instant::now();
    session.tick(now);
    // The fade was only started on this tick; still audible.
    assert_eq!(session.player_state(), PlayerState::Playing);

    session.tick(now);
    assert_eq!(session.player_state(), PlayerState::Empty);
}

#[test]
fn cancelled_sleep_timer_never_fires() {
    let (mut session, first, _) = session_with_two_tracks(0.0, 10);
    session.play_track(first).unwrap();
    session.start_sleep_timer(0, SleepAction::Pause);
    session.cancel_sleep_timer();

    session.tick(Instant::now() + Duration::from_secs(3600));
    assert_eq!(session.player_state(), PlayerState::Playing);
}

#[test]
fn snapshot_save_load_restore_round_trip() {
    let (mut session, first, second) = session_with_two_tracks(0.0, 10);
    session.play_track(first).unwrap();
    session.enqueue(second).unwrap();
    session.set_volume(0.5);

    let snapshot = session.snapshot();
    assert_eq!(snapshot.current_song_id, Some(first));
    assert_eq!(snapshot.queue, vec![second]);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    save_snapshot(&path, &snapshot);
    let loaded = load_snapshot(&path).unwrap();
    assert_eq!(loaded, snapshot);

    let store = Arc::clone(session.store());
    let (backend, _) = StubBackend::new();
    let mut restored = Session::new(store, PlaybackEngine::new(Box::new(backend), 0.0, 10));
    restored.restore(&loaded);

    // Restored paused at the old position, not auto-playing.
    assert_eq!(restored.player_state(), PlayerState::Loaded);
    assert_eq!(restored.queue().current().unwrap().track_id, first);
    assert_eq!(restored.queue().pending_ids(), vec![second]);
}

#[test]
fn missing_or_corrupt_snapshot_yields_none() {
    let dir = tempfile::tempdir().unwrap();
    assert!(load_snapshot(&dir.path().join("nope.json")).is_none());

    let path = dir.path().join("bad.json");
    fs::write(&path, "{not json").unwrap();
    assert!(load_snapshot(&path).is_none());
}

#[test]
fn restore_skips_tracks_no_longer_in_catalog() {
    let (mut session, first, _) = session_with_two_tracks(0.0, 10);
    let snapshot = SessionSnapshot {
        current_song_id: Some(7777),
        position_secs: 12.0,
        volume: 0.9,
        queue: vec![first, 8888],
    };
    session.restore(&snapshot);

    assert_eq!(session.player_state(), PlayerState::Empty);
    assert!(session.queue().current().is_none());
    assert_eq!(session.queue().pending_ids(), vec![first]);
}

#[test]
fn scan_results_surface_through_tick() {
    let (mut session, _, _) = session_with_two_tracks(0.0, 10);
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("Cool Band - Hit.mp3"), b"not really audio").unwrap();
    fs::write(dir.path().join("notes.txt"), b"skipped").unwrap();

    session.start_scan(vec![dir.path().to_path_buf()]);

    let deadline = Instant::now() + Duration::from_secs(5);
    while session.last_scan_summary().is_none() {
        assert!(Instant::now() < deadline, "scan never finished");
        session.tick(Instant::now());
        std::thread::sleep(Duration::from_millis(10));
    }

    let summary = session.last_scan_summary().unwrap();
    assert_eq!(summary.added, 1);
    assert_eq!(summary.failures, 0);
    assert!(session.scan_progress().is_none());

    let hit = session
        .store()
        .track_by_path(&dir.path().join("Cool Band - Hit.mp3"))
        .unwrap();
    assert!(hit.is_some());
}
