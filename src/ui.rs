//! UI rendering helpers for the terminal user interface.
//!
//! This module renders the player with `ratatui`: header, now-playing box,
//! timeline, story list and controls footer.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock};

use crate::app::{App, CatalogStatus, TimelineArea, duration_text};
use crate::catalog::Catalog;
use crate::config::{ControlsSettings, UiSettings};
use crate::player::Phase;

static CONTROLS_MAP: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut map = BTreeMap::new();
    map.insert("j/k", "up/down");
    map.insert("g/G", "top/bottom");
    map.insert("enter", "play selected story");
    map.insert("space/p", "play/pause");
    map.insert("h/l", "prev/next story");
    // H/L is filled dynamically from config.
    map.insert("click", "seek on timeline");
    map.insert("q", "quit");
    map
});

/// Render the controls help text, incorporating scrub seconds.
fn controls_text(scrub_seconds: u64) -> String {
    // Keep the rendered order stable and human-friendly.
    let order = ["space/p", "h/l", "H/L", "j/k", "enter", "g/G", "click", "q"];
    order
        .iter()
        .filter_map(|k| {
            if *k == "H/L" {
                Some(format!("[H/L] scrub -/+{}s", scrub_seconds))
            } else {
                CONTROLS_MAP.get(*k).map(|v| format!("[{}] {}", k, v))
            }
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

fn padded_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .padding(Padding {
            left: 1,
            right: 1,
            top: 0,
            bottom: 0,
        })
}

fn now_playing_lines(app: &App) -> (String, String) {
    match &app.status {
        CatalogStatus::Failed(_) => ("Error loading stories".to_string(), String::new()),
        CatalogStatus::Empty => ("No stories found".to_string(), String::new()),
        CatalogStatus::Ready => {
            let Some(s) = app.snapshot.as_ref() else {
                return ("Loading...".to_string(), String::new());
            };
            let title = s.title.clone().unwrap_or_default();
            let state = match s.phase {
                Phase::Idle => "Idle",
                Phase::Loading => "Loading",
                Phase::ReadyPaused => "Paused",
                Phase::ReadyPlaying => "Playing",
                Phase::Error => "Error",
            };
            (
                format!("{} {}", app.play_icon(), title),
                format!("{} • {}", s.duration_label, state),
            )
        }
    }
}

/// Render the entire UI into the provided `frame`; records where the
/// timeline landed so clicks can be mapped back.
pub fn draw(
    frame: &mut Frame,
    app: &mut App,
    catalog: &Catalog,
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(frame.area());

    // Header
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" tales ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    // Now playing
    let (title_line, detail_line) = now_playing_lines(app);
    let now_playing = Paragraph::new(vec![
        Line::from(Span::styled(
            title_line,
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(detail_line),
    ])
    .block(padded_block(" now playing "))
    .wrap(Wrap { trim: true });
    frame.render_widget(now_playing, chunks[1]);

    // Timeline
    let (ratio, label) = match app.snapshot.as_ref() {
        Some(s) => (
            s.progress.fraction,
            format!("{} / {}", s.progress.elapsed, s.progress.total),
        ),
        None => (0.0, "00:00 / 00:00".to_string()),
    };
    let timeline_block = Block::default().borders(Borders::ALL).title(" timeline ");
    let inner = timeline_block.inner(chunks[2]);
    app.timeline = Some(TimelineArea {
        x: inner.x,
        y: inner.y,
        width: inner.width,
        height: inner.height,
    });
    let gauge = Gauge::default()
        .block(timeline_block)
        .ratio(ratio.clamp(0.0, 1.0))
        .label(label);
    frame.render_widget(gauge, chunks[2]);

    draw_list(frame, app, catalog, chunks[3]);

    let footer = Paragraph::new(controls_text(controls_settings.scrub_seconds))
        .block(padded_block(" controls "))
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[4]);
}

fn draw_list(frame: &mut Frame, app: &App, catalog: &Catalog, area: Rect) {
    let title = if app.source_label.is_empty() {
        " stories ".to_string()
    } else {
        format!(" stories • {} ", app.source_label)
    };

    match &app.status {
        CatalogStatus::Failed(message) => {
            let p = Paragraph::new(format!("Error: {message}"))
                .block(padded_block(&title))
                .wrap(Wrap { trim: true });
            frame.render_widget(p, area);
            return;
        }
        CatalogStatus::Empty => {
            let p = Paragraph::new("No audio files found in the stories directory")
                .block(padded_block(&title))
                .wrap(Wrap { trim: true });
            frame.render_widget(p, area);
            return;
        }
        CatalogStatus::Ready => {}
    }

    let current = app.current_index();
    // Room for borders, the highlight symbol and the active marker.
    let width = area.width.saturating_sub(6) as usize;

    let items: Vec<ListItem> = catalog
        .iter()
        .enumerate()
        .map(|(i, track)| {
            let marker = if Some(i) == current { "♪ " } else { "  " };
            let duration = duration_text(track);
            let title_width = width.saturating_sub(duration.chars().count() + 1);
            let mut line = format!("{marker}{:<title_width$}", track.title);
            line.push(' ');
            line.push_str(&duration);

            let style = if Some(i) == current {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(line).style(style)
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if app.has_tracks() {
        state.select(Some(app.selected));
    }
    frame.render_stateful_widget(list, area, &mut state);
}
