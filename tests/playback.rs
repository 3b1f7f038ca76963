use std::time::{Duration, Instant};

use tracereplay::{DatasetBuilder, TelemetryDataset, TelemetrySample, TimelineSession};

fn short_dataset() -> TelemetryDataset {
    DatasetBuilder::new()
        .channel("A", "")
        .samples((0..=20).map(|i| {
            let t = i as f64 * 0.1;
            TelemetrySample::new(t).with_value("A", t)
        }))
        .build()
}

#[test]
fn play_without_dataset_is_a_noop() {
    let mut session = TimelineSession::default();
    assert!(!session.play());
    assert!(!session.is_playing());
}

#[test]
fn play_on_empty_dataset_is_rejected() {
    let mut session = TimelineSession::default();
    session.set_dataset(DatasetBuilder::new().channel("A", "").build());
    assert_eq!(session.duration(), 0.0);
    assert!(!session.play());
}

#[test]
fn play_while_playing_is_a_noop() {
    let mut session = TimelineSession::default();
    session.set_dataset(short_dataset());
    assert!(session.play());
    assert!(!session.play());
}

#[test]
fn ticks_advance_the_cursor_by_elapsed_time() {
    let mut session = TimelineSession::default();
    session.set_dataset(short_dataset());
    assert!(session.play());

    let now = Instant::now();
    session.tick_at(now + Duration::from_millis(500));
    // the clock anchors at play(); allow a little slack for the time between
    // play() and the captured `now`
    assert!(session.cursor() >= 0.5);
    assert!(session.cursor() < 0.7, "cursor {} ran ahead", session.cursor());
    assert!(session.is_playing());
}

#[test]
fn cursor_clamps_exactly_at_duration_and_playback_stops() {
    let mut session = TimelineSession::default();
    session.set_dataset(short_dataset());
    assert!(session.play());

    session.tick_at(Instant::now() + Duration::from_secs(60));
    assert_eq!(session.cursor(), session.duration());
    assert!(!session.is_playing(), "playback must auto-stop at the end");
}

#[test]
fn pause_retains_the_cursor() {
    let mut session = TimelineSession::default();
    session.set_dataset(short_dataset());
    assert!(session.play());
    session.tick_at(Instant::now() + Duration::from_millis(300));
    let cursor = session.cursor();
    assert!(cursor > 0.0);

    assert!(session.pause());
    assert!(!session.pause(), "pause is a noop while stopped");
    assert_eq!(session.cursor(), cursor);

    // stopped sessions ignore ticks
    session.tick_at(Instant::now() + Duration::from_secs(5));
    assert_eq!(session.cursor(), cursor);
}

#[test]
fn reset_forces_stopped_and_cursor_zero() {
    let mut session = TimelineSession::default();
    session.set_dataset(short_dataset());
    assert!(session.play());
    session.tick_at(Instant::now() + Duration::from_millis(300));
    session.reset();
    assert!(!session.is_playing());
    assert_eq!(session.cursor(), 0.0);
}
