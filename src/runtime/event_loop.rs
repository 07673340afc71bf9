use std::cell::RefCell;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::audio::{AudioPlayer, FilePrefetcher};
use crate::config;
use crate::player::{Controller, PlayerEvent, Snapshot};
use crate::ui;

type StoryController = Controller<AudioPlayer, FilePrefetcher>;

const SPINNER_INTERVAL: Duration = Duration::from_millis(120);

/// Main terminal event loop: feeds player events into the controller, draws,
/// and maps input to controller calls. Returns `Ok(())` when the user quits.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    controller: &mut StoryController,
    events: &mpsc::Receiver<PlayerEvent>,
    latest: &RefCell<Option<Snapshot>>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut last_spin = Instant::now();

    loop {
        while let Ok(player_event) = events.try_recv() {
            log::debug!("player event: {player_event:?}");
            controller.handle(player_event);
        }

        if let Some(snapshot) = latest.borrow_mut().take() {
            app.apply_snapshot(snapshot);
        }

        if last_spin.elapsed() >= SPINNER_INTERVAL {
            app.tick();
            last_spin = Instant::now();
        }

        terminal.draw(|f| {
            ui::draw(f, app, controller.catalog(), &settings.ui, &settings.controls)
        })?;

        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if handle_key_event(key, settings, app, controller) {
                        break;
                    }
                }
                Event::Mouse(mouse) => handle_mouse_event(mouse, app, controller),
                _ => {}
            }
        }
    }

    Ok(())
}

/// Returns true when the user asked to quit.
fn handle_key_event(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    controller: &mut StoryController,
) -> bool {
    let scrub = settings.controls.scrub_seconds as f64;

    match key.code {
        KeyCode::Char('q') => {
            controller
                .device()
                .quit_softly(Duration::from_millis(settings.audio.quit_fade_out_ms));
            return true;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.follow_playback_off();
            app.next();
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.follow_playback_off();
            app.prev();
        }
        KeyCode::Char('g') => {
            app.follow_playback_off();
            app.first();
        }
        KeyCode::Char('G') => {
            app.follow_playback_off();
            app.last();
        }
        KeyCode::Enter => {
            if app.has_tracks() {
                if settings.ui.follow_playback {
                    app.follow_playback_on();
                }
                controller.select_track(app.selected as isize, true);
            }
        }
        KeyCode::Char(' ') | KeyCode::Char('p') => {
            if settings.ui.follow_playback {
                app.follow_playback_on();
            }
            controller.toggle();
        }
        KeyCode::Char('l') | KeyCode::Right => {
            if settings.ui.follow_playback {
                app.follow_playback_on();
            }
            controller.next();
        }
        KeyCode::Char('h') | KeyCode::Left => {
            if settings.ui.follow_playback {
                app.follow_playback_on();
            }
            controller.previous();
        }
        KeyCode::Char('L') => controller.seek_by(scrub),
        KeyCode::Char('H') => controller.seek_by(-scrub),
        _ => {}
    }

    false
}

fn handle_mouse_event(mouse: MouseEvent, app: &App, controller: &mut StoryController) {
    if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
        if let Some((offset, width)) = app.pointer_on_timeline(mouse.column, mouse.row) {
            controller.seek(offset, width);
        }
    }
}
