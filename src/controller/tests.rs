use super::*;
use crate::backend::fake::{FakeBackend, FakeHandle};
use crate::config::Settings;
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::thread;
use tempfile::{TempDir, tempdir};

fn fast_settings() -> Settings {
    let mut settings = Settings::default();
    settings.watcher.poll_interval_ms = 10;
    settings.watcher.grace_delay_ms = 10;
    settings.watcher.end_margin_ms = 2000;
    settings
}

fn controller() -> (PlayerController<FakeBackend>, FakeHandle) {
    let (backend, handle) = FakeBackend::new();
    let controller = PlayerController::new(backend, CodecSupport::full(), &fast_settings());
    (controller, handle)
}

fn wav_file(dir: &TempDir, name: &str) -> PathBuf {
    let p = dir.path().join(name);
    fs::write(&p, b"not a real wav").unwrap();
    p
}

fn with_tracks(names: &[&str]) -> (PlayerController<FakeBackend>, FakeHandle, TempDir) {
    let dir = tempdir().unwrap();
    let (mut c, handle) = controller();
    for name in names {
        c.add_track(&wav_file(&dir, name)).unwrap();
    }
    (c, handle, dir)
}

#[test]
fn transport_on_empty_playlist_fails_without_state_change() {
    let (mut c, _handle) = controller();

    assert!(matches!(c.play_selected(0), Err(PlayerError::EmptyPlaylist)));
    assert!(matches!(c.next(), Err(PlayerError::EmptyPlaylist)));
    assert!(matches!(c.previous(), Err(PlayerError::EmptyPlaylist)));

    assert!(!c.is_playing());
    assert_eq!(c.current_index(), None);
    assert_eq!(c.track_count(), 0);
}

#[test]
fn play_selected_opens_and_tracks_current_index() {
    let (mut c, handle, _dir) = with_tracks(&["a.wav", "b.wav"]);

    let status = c.play_selected(1).unwrap();
    assert!(status.contains("2 of 2"));
    assert!(status.contains("b.wav"));
    assert_eq!(c.current_index(), Some(1));
    assert!(c.is_playing());
    assert_eq!(handle.lock().unwrap().opened.len(), 1);
}

#[test]
fn failed_open_surfaces_error_and_leaves_stopped() {
    let (mut c, handle, _dir) = with_tracks(&["a.wav"]);
    handle.lock().unwrap().fail_open = true;

    assert!(matches!(c.play_selected(0), Err(PlayerError::DecodeFailure(_))));
    assert!(!c.is_playing());
}

#[test]
fn pause_and_resume_keep_the_current_track() {
    let (mut c, handle, _dir) = with_tracks(&["a.wav"]);
    c.play_selected(0).unwrap();
    handle.lock().unwrap().position = Duration::from_secs(7);

    let status = c.pause().unwrap();
    assert!(status.contains("0:07"));
    assert!(!c.is_playing());
    assert_eq!(c.current_index(), Some(0));

    c.resume().unwrap();
    assert!(c.is_playing());
    assert_eq!(c.position(), Duration::from_secs(7));
}

#[test]
fn pause_when_stopped_is_a_harmless_noop() {
    let (mut c, _handle, _dir) = with_tracks(&["a.wav"]);
    assert_eq!(c.pause().unwrap(), "nothing to pause");
    assert_eq!(c.resume().unwrap(), "nothing to resume");
}

#[test]
fn stop_clears_the_current_track() {
    let (mut c, _handle, _dir) = with_tracks(&["a.wav"]);
    c.play_selected(0).unwrap();

    c.stop().unwrap();
    assert!(!c.is_playing());
    assert_eq!(c.current_index(), None);
    // A following next starts from the top again.
    c.next().unwrap();
    assert_eq!(c.current_index(), Some(0));
}

#[test]
fn next_wraps_even_with_repeat_off() {
    let (mut c, _handle, _dir) = with_tracks(&["a.wav", "b.wav"]);
    c.play_selected(1).unwrap();

    c.next().unwrap();
    assert_eq!(c.current_index(), Some(0));
}

#[test]
fn previous_wraps_from_first_to_last_and_ignores_shuffle() {
    let (mut c, _handle, _dir) = with_tracks(&["a.wav", "b.wav", "c.wav"]);
    c.toggle_shuffle().unwrap();
    c.play_selected(0).unwrap();

    c.previous().unwrap();
    assert_eq!(c.current_index(), Some(2));
    c.previous().unwrap();
    assert_eq!(c.current_index(), Some(1));
}

#[test]
fn manual_next_demotes_repeat_one_to_repeat_all() {
    let (mut c, _handle, _dir) = with_tracks(&["a.wav", "b.wav"]);
    c.toggle_repeat().unwrap(); // all
    c.toggle_repeat().unwrap(); // one
    assert_eq!(c.repeat_mode(), RepeatMode::One);
    c.play_selected(0).unwrap();

    let status = c.next().unwrap();
    assert!(status.contains("switched to repeat all"));
    assert_eq!(c.repeat_mode(), RepeatMode::All);
    assert_eq!(c.current_index(), Some(1));
}

#[test]
fn shuffle_visits_every_track_once_before_recycling() {
    let (mut c, _handle, _dir) = with_tracks(&["a.wav", "b.wav", "c.wav"]);
    c.toggle_shuffle().unwrap();

    let mut seen = HashSet::new();
    for _ in 0..3 {
        c.next().unwrap();
        seen.insert(c.current_index().unwrap());
    }
    assert_eq!(seen.len(), 3);

    // The fourth skip starts a fresh cycle instead of stalling.
    c.next().unwrap();
    assert!(c.current_index().is_some());
}

#[test]
fn removing_the_playing_track_stops_and_clears_the_index() {
    let (mut c, _handle, _dir) = with_tracks(&["a.wav", "b.wav"]);
    c.play_selected(0).unwrap();

    c.remove_track(0).unwrap();
    assert!(!c.is_playing());
    assert_eq!(c.current_index(), None);
    assert_eq!(c.track_count(), 1);
}

#[test]
fn removing_an_earlier_track_shifts_the_current_index_down() {
    let (mut c, _handle, _dir) = with_tracks(&["a.wav", "b.wav", "c.wav"]);
    c.play_selected(2).unwrap();

    c.remove_track(0).unwrap();
    assert_eq!(c.current_index(), Some(1));
    assert!(c.is_playing());
}

#[test]
fn inserting_before_the_current_track_shifts_it_up() {
    let dir = tempdir().unwrap();
    let (mut c, _handle) = controller();
    c.add_track(&wav_file(&dir, "a.wav")).unwrap();
    c.add_track(&wav_file(&dir, "b.wav")).unwrap();
    c.play_selected(1).unwrap();

    c.insert_track(&wav_file(&dir, "c.wav"), 0).unwrap();
    assert_eq!(c.current_index(), Some(2));
    c.insert_track(&wav_file(&dir, "d.wav"), 3).unwrap();
    assert_eq!(c.current_index(), Some(2));
}

#[test]
fn moving_tracks_follows_the_playing_one() {
    let (mut c, _handle, _dir) = with_tracks(&["a.wav", "b.wav", "c.wav"]);
    c.play_selected(1).unwrap();

    c.move_track(1, 2).unwrap();
    assert_eq!(c.current_index(), Some(2));
    c.move_up(2).unwrap();
    assert_eq!(c.current_index(), Some(1));

    // Moving another track across the current one renumbers it.
    c.move_track(2, 0).unwrap();
    assert_eq!(c.current_index(), Some(2));
}

#[test]
fn move_at_the_edges_reports_instead_of_failing() {
    let (mut c, _handle, _dir) = with_tracks(&["a.wav", "b.wav"]);
    assert_eq!(c.move_up(0).unwrap(), "track is already first");
    assert_eq!(c.move_down(1).unwrap(), "track is already last");
    assert!(matches!(
        c.move_up(5),
        Err(PlayerError::InvalidIndex { index: 5, len: 2 })
    ));
}

#[test]
fn clear_stops_playback_and_empties_the_list() {
    let (mut c, _handle, _dir) = with_tracks(&["a.wav", "b.wav"]);
    c.play_selected(0).unwrap();

    c.clear().unwrap();
    assert!(!c.is_playing());
    assert_eq!(c.current_index(), None);
    assert_eq!(c.track_count(), 0);
}

#[test]
fn natural_track_end_advances_to_the_next_track() {
    let (mut c, handle, _dir) = with_tracks(&["a.wav", "b.wav"]);
    c.play_selected(0).unwrap();

    // Simulate the sink draining at the end of the stream.
    {
        let mut s = handle.lock().unwrap();
        s.position = s.duration - Duration::from_millis(500);
        s.playing = false;
    }
    thread::sleep(Duration::from_millis(200));

    let status = c.process_events().expect("watcher signals the track end");
    assert!(status.contains("b.wav"));
    assert_eq!(c.current_index(), Some(1));
    assert!(c.is_playing());
}

#[test]
fn repeat_one_replays_the_same_track_on_natural_end() {
    let (mut c, handle, _dir) = with_tracks(&["a.wav", "b.wav"]);
    c.toggle_repeat().unwrap(); // all
    c.toggle_repeat().unwrap(); // one
    c.play_selected(0).unwrap();

    {
        let mut s = handle.lock().unwrap();
        s.position = s.duration - Duration::from_millis(100);
        s.playing = false;
    }
    thread::sleep(Duration::from_millis(200));

    c.process_events().expect("watcher signals the track end");
    assert_eq!(c.current_index(), Some(0));
    assert_eq!(c.repeat_mode(), RepeatMode::One);
    assert_eq!(handle.lock().unwrap().opened.len(), 2);
}

#[test]
fn end_signal_from_a_replaced_session_is_discarded() {
    let (mut c, handle, _dir) = with_tracks(&["a.wav", "b.wav", "c.wav"]);
    c.play_selected(0).unwrap();

    // Let the first session's watcher report an end...
    {
        let mut s = handle.lock().unwrap();
        s.position = s.duration - Duration::from_millis(100);
        s.playing = false;
    }
    thread::sleep(Duration::from_millis(200));

    // ...then start a new session before the event is processed. The open
    // resets the fake position, so the new watcher stays quiet.
    c.play_selected(1).unwrap();
    assert_eq!(c.process_events(), None);
    assert_eq!(c.current_index(), Some(1));
}

#[test]
fn volume_is_forwarded_in_decibels() {
    let (mut c, handle, _dir) = with_tracks(&["a.wav"]);

    c.set_volume(100).unwrap();
    assert_eq!(handle.lock().unwrap().gain_db, Some(0.0));
    c.set_volume(0).unwrap();
    assert_eq!(handle.lock().unwrap().gain_db, Some(f32::NEG_INFINITY));
    assert_eq!(c.set_volume(150).unwrap(), "volume 100%");
}

#[test]
fn seek_percent_targets_a_fraction_of_the_duration() {
    let (mut c, handle, _dir) = with_tracks(&["a.wav"]);
    assert_eq!(c.seek_percent(50).unwrap(), "nothing is playing");

    c.play_selected(0).unwrap();
    c.seek_percent(50).unwrap();
    assert_eq!(handle.lock().unwrap().position, Duration::from_secs(30));
    c.seek_percent(200).unwrap();
    assert_eq!(handle.lock().unwrap().position, Duration::from_secs(60));
}

#[test]
fn add_directory_appends_supported_files_sorted() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("b.wav"), b"x").unwrap();
    fs::write(dir.path().join("a.mp3"), b"x").unwrap();
    fs::write(dir.path().join("notes.txt"), b"x").unwrap();

    let (mut c, _handle) = controller();
    let status = c.add_directory(dir.path()).unwrap();
    assert!(status.contains("added 2 tracks"));
    let names: Vec<String> = c.entries().into_iter().map(|(_, n)| n).collect();
    assert_eq!(names, vec!["a.mp3".to_string(), "b.wav".to_string()]);
}

#[test]
fn unsupported_files_are_rejected_on_add() {
    let dir = tempdir().unwrap();
    let p = dir.path().join("cover.png");
    fs::write(&p, b"x").unwrap();

    let (mut c, _handle) = controller();
    assert!(matches!(
        c.add_track(&p),
        Err(PlayerError::UnsupportedFormat(_))
    ));
    assert_eq!(c.track_count(), 0);
}

#[test]
fn format_time_renders_minutes_and_seconds() {
    assert_eq!(format_time(Duration::ZERO), "0:00");
    assert_eq!(format_time(Duration::from_secs(65)), "1:05");
    assert_eq!(format_time(Duration::from_secs(600)), "10:00");
}
