use crate::catalog::{Catalog, DurationState};
use crate::error::ProbeError;

use super::device::{
    DeviceSignal, MetadataProbe, PlayOutcome, PlaybackDevice, PlayerEvent, Prefetcher,
    SessionToken,
};
use super::preload::Preloader;
use super::progress::{Progress, format_clock, report_time, seek_from_pointer};
use super::resolver::DurationResolver;

/// Where the controller is in its load/play cycle.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Nothing selected yet (or the catalog is empty).
    Idle,
    /// A load was issued and the device has not reported readiness.
    Loading,
    ReadyPaused,
    ReadyPlaying,
    /// The current track could not be loaded. Selecting another one recovers.
    Error,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// The controller's core flags.
///
/// `is_playing` is the user's intent and may be true while `is_loading` is
/// still true; the device catches up once it reports readiness.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct PlaybackState {
    pub current_index: usize,
    pub is_playing: bool,
    pub is_loading: bool,
}

/// Everything a view needs to draw the player.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub state: PlaybackState,
    pub phase: Phase,
    pub session: SessionToken,
    /// A play request is out and its outcome has not arrived.
    pub starting: bool,
    pub title: Option<String>,
    /// Formatted duration, `Loading...` or `Unavailable`.
    pub duration_label: String,
    pub progress: Progress,
}

type Subscriber = Box<dyn FnMut(&Snapshot)>;

/// Playlist state machine in front of a single playback device.
///
/// All mutation happens through `&mut self` on one thread: user input calls
/// the transition methods directly, asynchronous completions arrive through
/// [`Controller::handle`]. Device signals carrying a session token other than
/// the current one belong to an abandoned load and are dropped.
pub struct Controller<D, F> {
    catalog: Catalog,
    device: D,
    prefetcher: F,
    preloader: Preloader,
    state: PlaybackState,
    phase: Phase,
    session: SessionToken,
    starting: bool,
    elapsed: f64,
    progress: Progress,
    subscribers: Vec<Subscriber>,
}

impl<D: PlaybackDevice, F: Prefetcher> Controller<D, F> {
    pub fn new(catalog: Catalog, device: D, prefetcher: F, preloader: Preloader) -> Self {
        Self {
            catalog,
            device,
            prefetcher,
            preloader,
            state: PlaybackState::default(),
            phase: Phase::Idle,
            session: SessionToken::default(),
            starting: false,
            elapsed: 0.0,
            progress: Progress::default(),
            subscribers: Vec::new(),
        }
    }

    /// Kick off duration probing and load the first track.
    ///
    /// With `autoplay` the first track starts as soon as the device is ready.
    pub fn start(&mut self, probe: &mut impl MetadataProbe, autoplay: bool) {
        if self.catalog.is_empty() {
            log::info!("catalog is empty, nothing to load");
            self.notify();
            return;
        }
        DurationResolver::start(&mut self.catalog, probe);
        self.state.is_playing = autoplay;
        self.select_track(0, true);
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    /// Call `f` with a fresh snapshot after every state change.
    pub fn subscribe(&mut self, f: impl FnMut(&Snapshot) + 'static) {
        self.subscribers.push(Box::new(f));
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.state,
            phase: self.phase,
            session: self.session,
            starting: self.starting,
            title: self.current_track_title(),
            duration_label: self.duration_label(),
            progress: self.progress.clone(),
        }
    }

    fn current_track_title(&self) -> Option<String> {
        self.catalog
            .get(self.state.current_index)
            .map(|t| t.title.clone())
    }

    fn duration_label(&self) -> String {
        if self.phase == Phase::Error {
            return "Unavailable".to_string();
        }
        match self.catalog.get(self.state.current_index).map(|t| t.duration) {
            Some(DurationState::Known(s)) => format_clock(s),
            Some(DurationState::Unavailable) => "Unavailable".to_string(),
            _ => "Loading...".to_string(),
        }
    }

    fn current_total(&self) -> Option<f64> {
        self.catalog
            .get(self.state.current_index)
            .and_then(|t| t.duration.seconds())
    }

    fn notify(&mut self) {
        if self.subscribers.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        for subscriber in self.subscribers.iter_mut() {
            subscriber(&snapshot);
        }
    }

    fn is_current(&self, token: SessionToken) -> bool {
        self.phase != Phase::Idle && token == self.session
    }

    /// Make `index` the current track and ask the device to load it.
    ///
    /// Indices outside the catalog wrap around. Re-selecting the current
    /// track is a no-op unless `force` is set. Play intent is kept.
    pub fn select_track(&mut self, index: isize, force: bool) {
        let Some(index) = self.catalog.wrap_index(index) else {
            return;
        };
        if index == self.state.current_index && !force {
            return;
        }

        self.session = self.session.next();
        self.state.current_index = index;
        self.phase = Phase::Loading;
        self.starting = false;
        self.elapsed = 0.0;

        let next = self
            .catalog
            .wrap_index(index as isize + 1)
            .filter(|&n| n != index);
        self.release_buffers(index, next);

        let Some(track) = self.catalog.get(index) else {
            return;
        };
        self.state.is_loading = !track.ready;
        self.progress = report_time(0.0, track.duration.seconds());

        log::info!(
            "loading #{index} {:?} (session {})",
            track.title,
            self.session.0
        );
        self.device.load(self.session, &track.locator);
        self.notify();
    }

    /// Keep buffered data only for the current track and the one after it.
    /// Everything else loses its readiness so the preload chain can fetch it
    /// again later.
    fn release_buffers(&mut self, current: usize, next: Option<usize>) {
        let mut keep = Vec::with_capacity(2);
        for index in 0..self.catalog.len() {
            let Some(track) = self.catalog.get_mut(index) else {
                continue;
            };
            if index == current || Some(index) == next {
                keep.push(track.locator.clone());
            } else {
                track.ready = false;
            }
        }
        let keep: Vec<&str> = keep.iter().map(String::as_str).collect();
        self.prefetcher.retain(&keep);
    }

    /// Start playback, or remember the wish while the track is loading.
    pub fn play(&mut self) {
        if self.phase == Phase::Idle {
            return;
        }
        self.state.is_playing = true;
        if self.state.is_loading {
            self.notify();
            return;
        }
        self.starting = true;
        self.device.play(self.session);
        self.notify();
    }

    /// Pause the device and drop the play intent.
    ///
    /// A pending load stays `Loading` and a failed one stays `Error`; any
    /// other phase becomes `ReadyPaused`.
    pub fn pause(&mut self) {
        self.device.pause();
        self.state.is_playing = false;
        self.starting = false;
        self.phase = match self.phase {
            Phase::Idle | Phase::Error => self.phase,
            Phase::Loading if self.state.is_loading => Phase::Loading,
            _ => Phase::ReadyPaused,
        };
        self.notify();
    }

    /// Play or pause depending on what the device reports, not on intent.
    pub fn toggle(&mut self) {
        if self.device.is_paused() {
            self.play();
        } else {
            self.pause();
        }
    }

    pub fn advance(&mut self, direction: Direction) {
        let current = self.state.current_index as isize;
        let target = match direction {
            Direction::Forward => current + 1,
            Direction::Backward => current - 1,
        };
        self.select_track(target, true);
    }

    pub fn next(&mut self) {
        self.advance(Direction::Forward);
    }

    pub fn previous(&mut self) {
        self.advance(Direction::Backward);
    }

    /// Seek to the position under a pointer on a timeline `track_width` wide.
    pub fn seek(&mut self, pointer_offset: f64, track_width: f64) {
        let total = self.current_total();
        if let Some(seconds) = seek_from_pointer(pointer_offset, track_width, total) {
            self.seek_to(seconds, total);
        }
    }

    /// Scrub relative to the last reported position.
    pub fn seek_by(&mut self, delta_seconds: f64) {
        let Some(total) = self.current_total() else {
            return;
        };
        let seconds = (self.elapsed + delta_seconds).clamp(0.0, total);
        self.seek_to(seconds, Some(total));
    }

    fn seek_to(&mut self, seconds: f64, total: Option<f64>) {
        if self.phase == Phase::Idle {
            return;
        }
        self.device.set_current_time(seconds);
        self.elapsed = seconds;
        self.progress = report_time(seconds, total);
        self.notify();
    }

    /// Dispatch one asynchronous completion.
    pub fn handle(&mut self, event: PlayerEvent) {
        match event {
            PlayerEvent::Device { token, signal } => match signal {
                DeviceSignal::MetadataLoaded(seconds) => self.on_metadata_loaded(token, seconds),
                DeviceSignal::ReadyToPlayThrough => self.on_device_ready(token),
                DeviceSignal::TimeUpdated { current, total } => {
                    self.on_time_updated(token, current, total)
                }
                DeviceSignal::Ended => self.on_ended(token),
                DeviceSignal::Error(reason) => self.on_device_error(token, &reason),
                DeviceSignal::PlayOutcome(outcome) => self.on_play_outcome(token, outcome),
            },
            PlayerEvent::PreloadReady(index) => {
                self.preloader
                    .on_ready(index, &mut self.catalog, &mut self.prefetcher);
                self.notify();
            }
            PlayerEvent::PreloadFailed(index) => {
                self.preloader
                    .on_failed(index, &self.catalog, &mut self.prefetcher);
            }
            PlayerEvent::Probed { index, result } => self.on_probed(index, result),
        }
    }

    /// The device buffered enough of the current track to play through.
    pub fn on_device_ready(&mut self, token: SessionToken) {
        if !self.is_current(token) {
            log::debug!("dropping stale readiness for session {}", token.0);
            return;
        }
        let index = self.state.current_index;
        self.state.is_loading = false;
        if let Some(track) = self.catalog.get_mut(index) {
            track.ready = true;
        }

        // The loading indicator clears before any play attempt goes out.
        if self.state.is_playing && self.phase != Phase::ReadyPlaying && !self.starting {
            self.notify();
            self.play();
        } else {
            if !self.state.is_playing {
                self.phase = Phase::ReadyPaused;
            }
            self.notify();
        }

        self.preloader
            .preload(index + 1, &self.catalog, &mut self.prefetcher);
    }

    pub fn on_device_error(&mut self, token: SessionToken, reason: &str) {
        if !self.is_current(token) {
            log::debug!("dropping stale error for session {}: {reason}", token.0);
            return;
        }
        log::error!("track #{} failed to load: {reason}", self.state.current_index);
        self.state.is_loading = false;
        self.state.is_playing = false;
        self.starting = false;
        self.phase = Phase::Error;
        self.elapsed = 0.0;
        self.progress = Progress::default();
        self.notify();
    }

    pub fn on_metadata_loaded(&mut self, token: SessionToken, seconds: f64) {
        if !self.is_current(token) {
            return;
        }
        if !(seconds.is_finite() && seconds > 0.0) {
            return;
        }
        if let Some(track) = self.catalog.get_mut(self.state.current_index) {
            track.duration = DurationState::Known(seconds);
        }
        self.progress = report_time(self.elapsed, Some(seconds));
        self.notify();
    }

    pub fn on_time_updated(&mut self, token: SessionToken, current: f64, total: Option<f64>) {
        if !self.is_current(token) {
            return;
        }
        let total = total
            .filter(|t| t.is_finite() && *t > 0.0)
            .or_else(|| self.current_total());
        self.elapsed = current;
        self.progress = report_time(current, total);
        self.notify();
    }

    /// Natural end of track: always move forward and always reload, even
    /// when wrapping onto the same index.
    pub fn on_ended(&mut self, token: SessionToken) {
        if !self.is_current(token) {
            return;
        }
        log::debug!("track #{} ended", self.state.current_index);
        self.advance(Direction::Forward);
    }

    pub fn on_play_outcome(&mut self, token: SessionToken, outcome: PlayOutcome) {
        if !self.is_current(token) {
            return;
        }
        self.starting = false;
        match outcome {
            PlayOutcome::Started => {
                if self.state.is_playing {
                    self.phase = Phase::ReadyPlaying;
                }
                self.notify();
            }
            PlayOutcome::Rejected(reason) => {
                log::warn!("device refused to play: {reason}");
                self.pause();
            }
        }
    }

    fn on_probed(&mut self, index: usize, result: Result<f64, ProbeError>) {
        if !DurationResolver::apply(&mut self.catalog, index, result) {
            return;
        }
        if index == self.state.current_index && self.phase != Phase::Error {
            self.progress = report_time(self.elapsed, self.current_total());
        }
        self.notify();
    }
}
