//! Application model types: `App` and `CatalogStatus`.
//!
//! The `App` struct holds what the view needs beyond the controller's
//! snapshot: the list cursor, whether the catalog loaded, and where the
//! timeline was last drawn so pointer clicks can be mapped back to it.

use crate::catalog::{DurationState, TrackDescriptor};
use crate::player::{Phase, Snapshot, format_clock};

const SPINNER: [&str; 4] = ["◐", "◓", "◑", "◒"];

/// Outcome of building the catalog, as shown in place of the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogStatus {
    Ready,
    Empty,
    Failed(String),
}

/// Screen cells occupied by the timeline gauge.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TimelineArea {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

/// The main application model.
pub struct App {
    pub selected: usize,
    pub status: CatalogStatus,
    pub snapshot: Option<Snapshot>,
    pub follow_playback: bool,
    pub timeline: Option<TimelineArea>,
    pub source_label: String,
    len: usize,
    spinner_frame: usize,
}

impl App {
    /// Create a new `App` for a catalog of `len` entries.
    pub fn new(len: usize, status: CatalogStatus) -> Self {
        Self {
            selected: 0,
            status,
            snapshot: None,
            follow_playback: true,
            timeline: None,
            source_label: String::new(),
            len,
            spinner_frame: 0,
        }
    }

    /// Return true if the catalog contains any stories.
    pub fn has_tracks(&self) -> bool {
        self.len > 0
    }

    /// Take in the controller's latest state; the cursor follows the current
    /// story when `follow_playback` is on.
    pub fn apply_snapshot(&mut self, snapshot: Snapshot) {
        let moved = self
            .snapshot
            .as_ref()
            .map(|s| s.state.current_index != snapshot.state.current_index)
            .unwrap_or(true);
        if self.follow_playback && moved && snapshot.state.current_index < self.len {
            self.selected = snapshot.state.current_index;
        }
        self.snapshot = Some(snapshot);
    }

    pub fn current_index(&self) -> Option<usize> {
        self.snapshot.as_ref().map(|s| s.state.current_index)
    }

    /// Advance the spinner animation by one frame.
    pub fn tick(&mut self) {
        self.spinner_frame = (self.spinner_frame + 1) % SPINNER.len();
    }

    /// Icon for the play/pause control: a spinner while waiting on the
    /// device, pause while playing, play otherwise.
    pub fn play_icon(&self) -> &'static str {
        let Some(s) = self.snapshot.as_ref() else {
            return "▶";
        };
        if s.state.is_loading || s.starting {
            return SPINNER[self.spinner_frame];
        }
        if s.phase == Phase::ReadyPlaying && s.state.is_playing {
            "⏸"
        } else {
            "▶"
        }
    }

    /// Move the cursor down, wrapping to the top.
    pub fn next(&mut self) {
        if self.len > 0 {
            self.selected = (self.selected + 1) % self.len;
        }
    }

    /// Move the cursor up, wrapping to the bottom.
    pub fn prev(&mut self) {
        if self.len > 0 {
            self.selected = (self.selected + self.len - 1) % self.len;
        }
    }

    pub fn first(&mut self) {
        self.selected = 0;
    }

    pub fn last(&mut self) {
        self.selected = self.len.saturating_sub(1);
    }

    pub fn follow_playback_on(&mut self) {
        self.follow_playback = true;
    }

    pub fn follow_playback_off(&mut self) {
        self.follow_playback = false;
    }

    /// Translate a click into `(offset, width)` along the timeline, if it
    /// landed on it.
    pub fn pointer_on_timeline(&self, column: u16, row: u16) -> Option<(f64, f64)> {
        let area = self.timeline?;
        let inside_x = column >= area.x && column < area.x.saturating_add(area.width);
        let inside_y = row >= area.y && row < area.y.saturating_add(area.height);
        if !(inside_x && inside_y) || area.width == 0 {
            return None;
        }
        Some(((column - area.x) as f64, area.width as f64))
    }
}

/// Duration column text for a list row.
pub fn duration_text(track: &TrackDescriptor) -> String {
    match track.duration {
        DurationState::Known(s) => format_clock(s),
        DurationState::Unavailable => "Unavailable".to_string(),
        DurationState::Unknown | DurationState::Probing => "Loading...".to_string(),
    }
}
