use std::cell::RefCell;
use std::env;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::mpsc;

use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{App, CatalogStatus};
use crate::audio::{AudioPlayer, FilePrefetcher, LoftyProbe, new_cache};
use crate::catalog::{Catalog, CatalogSource, fetch_catalog};
use crate::config;
use crate::player::{Controller, PlayerEvent, Preloader, Snapshot};

mod event_loop;
mod settings;

/// Fetch the catalog for `dir`; a failure becomes a status shown in place
/// of the list.
fn load_catalog(dir: &Path, settings: &config::LibrarySettings) -> (Catalog, CatalogStatus) {
    let source = CatalogSource::resolve(dir, &settings.manifest_name);
    match fetch_catalog(&source, settings) {
        Ok(files) => {
            let catalog = Catalog::build(&source.base_dir(), &files);
            let status = if catalog.is_empty() {
                CatalogStatus::Empty
            } else {
                CatalogStatus::Ready
            };
            (catalog, status)
        }
        Err(e) => {
            log::error!("catalog unavailable: {e}");
            (Catalog::default(), CatalogStatus::Failed(e.to_string()))
        }
    }
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = settings::load_settings();
    settings::init_logging(&settings.logging)?;

    let dir = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&settings.library.stories_dir));
    log::info!("stories directory: {}", dir.display());

    let (catalog, status) = load_catalog(&dir, &settings.library);
    let mut app = App::new(catalog.len(), status);
    app.follow_playback = settings.ui.follow_playback;
    app.source_label = dir.display().to_string();

    let (event_tx, event_rx) = mpsc::channel::<PlayerEvent>();
    let cache = new_cache(settings.playback.preload_capacity);
    let audio_player = AudioPlayer::new(event_tx.clone(), cache.clone(), settings.audio.clone());
    let prefetcher = FilePrefetcher::new(cache, event_tx.clone());
    let preloader = Preloader::new(settings.playback.preload);
    let mut controller = Controller::new(catalog, audio_player, prefetcher, preloader);

    let latest: Rc<RefCell<Option<Snapshot>>> = Rc::new(RefCell::new(None));
    let sink = latest.clone();
    controller.subscribe(move |snapshot| {
        *sink.borrow_mut() = Some(snapshot.clone());
    });

    let mut probe = LoftyProbe::new(event_tx);
    controller.start(&mut probe, settings.playback.autoplay);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = event_loop::run(
        &mut terminal,
        &settings,
        &mut app,
        &mut controller,
        &event_rx,
        &latest,
    );

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    run_result
}
