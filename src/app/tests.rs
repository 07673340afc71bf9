use super::*;
use crate::catalog::{DurationState, TrackDescriptor};
use crate::player::{Phase, PlaybackState, Progress, SessionToken, Snapshot};

fn snap(index: usize, phase: Phase, playing: bool, loading: bool) -> Snapshot {
    Snapshot {
        state: PlaybackState {
            current_index: index,
            is_playing: playing,
            is_loading: loading,
        },
        phase,
        session: SessionToken(1),
        starting: false,
        title: Some("A Story".into()),
        duration_label: "Loading...".into(),
        progress: Progress::default(),
    }
}

#[test]
fn cursor_wraps_both_ways() {
    let mut app = App::new(3, CatalogStatus::Ready);
    app.prev();
    assert_eq!(app.selected, 2);
    app.next();
    assert_eq!(app.selected, 0);
    app.last();
    assert_eq!(app.selected, 2);
    app.first();
    assert_eq!(app.selected, 0);
}

#[test]
fn empty_catalog_cursor_stays_put() {
    let mut app = App::new(0, CatalogStatus::Empty);
    app.next();
    app.prev();
    app.last();
    assert_eq!(app.selected, 0);
    assert!(!app.has_tracks());
}

#[test]
fn snapshot_moves_cursor_only_when_following() {
    let mut app = App::new(3, CatalogStatus::Ready);
    app.apply_snapshot(snap(1, Phase::Loading, false, true));
    assert_eq!(app.selected, 1);

    app.follow_playback_off();
    app.next();
    app.apply_snapshot(snap(0, Phase::Loading, false, true));
    assert_eq!(app.selected, 2);
    assert_eq!(app.current_index(), Some(0));

    // Following again only jumps on the next change of story.
    app.follow_playback_on();
    app.apply_snapshot(snap(0, Phase::ReadyPaused, false, false));
    assert_eq!(app.selected, 2);
    app.apply_snapshot(snap(1, Phase::Loading, false, true));
    assert_eq!(app.selected, 1);
}

#[test]
fn play_icon_reflects_loading_and_playing() {
    let mut app = App::new(1, CatalogStatus::Ready);
    assert_eq!(app.play_icon(), "▶");

    app.apply_snapshot(snap(0, Phase::Loading, true, true));
    assert_eq!(app.play_icon(), "◐");
    app.tick();
    assert_eq!(app.play_icon(), "◓");

    app.apply_snapshot(snap(0, Phase::ReadyPlaying, true, false));
    assert_eq!(app.play_icon(), "⏸");

    app.apply_snapshot(snap(0, Phase::ReadyPaused, false, false));
    assert_eq!(app.play_icon(), "▶");

    let mut starting = snap(0, Phase::ReadyPaused, true, false);
    starting.starting = true;
    app.apply_snapshot(starting);
    assert_eq!(app.play_icon(), "◓");
}

#[test]
fn pointer_on_timeline_maps_columns() {
    let mut app = App::new(1, CatalogStatus::Ready);
    assert_eq!(app.pointer_on_timeline(5, 5), None);

    app.timeline = Some(TimelineArea {
        x: 10,
        y: 4,
        width: 40,
        height: 1,
    });
    assert_eq!(app.pointer_on_timeline(10, 4), Some((0.0, 40.0)));
    assert_eq!(app.pointer_on_timeline(30, 4), Some((20.0, 40.0)));
    assert_eq!(app.pointer_on_timeline(50, 4), None);
    assert_eq!(app.pointer_on_timeline(30, 5), None);
}

#[test]
fn duration_text_covers_every_state() {
    let mut t = TrackDescriptor::new("A", "a.mp3");
    assert_eq!(duration_text(&t), "Loading...");
    t.duration = DurationState::Probing;
    assert_eq!(duration_text(&t), "Loading...");
    t.duration = DurationState::Known(125.0);
    assert_eq!(duration_text(&t), "02:05");
    t.duration = DurationState::Unavailable;
    assert_eq!(duration_text(&t), "Unavailable");
}
