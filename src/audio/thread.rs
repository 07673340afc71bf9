use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use rodio::{OutputStream, OutputStreamBuilder, Sink, Source};

use crate::config::AudioSettings;
use crate::player::{DeviceSignal, PlayOutcome, PlayerEvent, SessionToken};

use super::sink::{create_sink_at, open_source};
use super::types::{AudioCmd, PrefetchCache, StatusHandle};

/// State owned by the audio thread: the output, the current sink and the
/// clock used to report elapsed time.
struct Deck {
    stream: Option<OutputStream>,
    sink: Option<Sink>,
    token: Option<SessionToken>,
    locator: Option<String>,
    total: Option<Duration>,
    paused: bool,
    // Track start time and accumulated elapsed when paused.
    started_at: Option<Instant>,
    accumulated: Duration,
    ended_sent: bool,
    events: Sender<PlayerEvent>,
    status: StatusHandle,
    cache: PrefetchCache,
}

impl Deck {
    fn new(
        stream: Option<OutputStream>,
        events: Sender<PlayerEvent>,
        status: StatusHandle,
        cache: PrefetchCache,
    ) -> Self {
        Self {
            stream,
            sink: None,
            token: None,
            locator: None,
            total: None,
            paused: true,
            started_at: None,
            accumulated: Duration::ZERO,
            ended_sent: false,
            events,
            status,
            cache,
        }
    }

    fn emit(&self, token: SessionToken, signal: DeviceSignal) {
        let _ = self.events.send(PlayerEvent::Device { token, signal });
    }

    fn elapsed(&self) -> Duration {
        let elapsed = self.accumulated + self.started_at.map_or(Duration::ZERO, |st| st.elapsed());
        match self.total {
            Some(total) => elapsed.min(total),
            None => elapsed,
        }
    }

    fn publish(&self) {
        if let Ok(mut status) = self.status.lock() {
            status.paused = self.paused;
        }
    }

    fn load(&mut self, token: SessionToken, locator: String) {
        if let Some(old) = self.sink.take() {
            old.stop();
        }
        self.token = Some(token);
        self.total = None;
        self.paused = true;
        self.started_at = None;
        self.accumulated = Duration::ZERO;
        self.ended_sent = false;
        self.publish();

        let Some(stream) = self.stream.as_ref() else {
            self.emit(token, DeviceSignal::Error("no audio output device".to_string()));
            return;
        };

        match open_source(&locator, &self.cache) {
            Ok(source) => {
                let total = source.total_duration();
                self.sink = Some(create_sink_at(stream, source, Duration::ZERO));
                self.total = total;
                if let Some(total) = total {
                    self.emit(token, DeviceSignal::MetadataLoaded(total.as_secs_f64()));
                }
                // The whole file sits in memory once decoding starts.
                self.emit(token, DeviceSignal::ReadyToPlayThrough);
            }
            Err(e) => {
                log::error!("{e}");
                self.emit(token, DeviceSignal::Error(e.to_string()));
            }
        }
        self.locator = Some(locator);
    }

    fn play(&mut self, token: SessionToken) {
        if self.token != Some(token) {
            log::debug!("ignoring play for superseded session {}", token.0);
            return;
        }
        let Some(sink) = self.sink.as_ref() else {
            self.emit(
                token,
                DeviceSignal::PlayOutcome(PlayOutcome::Rejected("nothing loaded".to_string())),
            );
            return;
        };
        if self.paused {
            sink.play();
            self.paused = false;
            self.started_at = Some(Instant::now());
        }
        self.publish();
        self.emit(token, DeviceSignal::PlayOutcome(PlayOutcome::Started));
    }

    fn pause(&mut self) {
        if let Some(sink) = self.sink.as_ref() {
            sink.pause();
        }
        if let Some(st) = self.started_at.take() {
            self.accumulated += st.elapsed();
        }
        self.paused = true;
        self.publish();
    }

    /// Scrubbing: rebuild the current sink and skip into the source.
    fn seek(&mut self, position: Duration) {
        let (Some(token), Some(locator)) = (self.token, self.locator.clone()) else {
            return;
        };
        if self.sink.is_none() {
            return;
        }
        let Some(stream) = self.stream.as_ref() else {
            return;
        };
        let position = match self.total {
            Some(total) => position.min(total),
            None => position,
        };

        let source = match open_source(&locator, &self.cache) {
            Ok(source) => source,
            Err(e) => {
                log::error!("seek failed: {e}");
                self.emit(token, DeviceSignal::Error(e.to_string()));
                return;
            }
        };

        // Stop old sink and replace with a fresh one.
        let new_sink = create_sink_at(stream, source, position);
        if let Some(old) = self.sink.take() {
            old.stop();
        }
        if self.paused {
            self.started_at = None;
        } else {
            new_sink.play();
            self.started_at = Some(Instant::now());
        }
        self.sink = Some(new_sink);
        self.accumulated = position;
        self.ended_sent = false;
        self.publish();
        self.report_time(token);
    }

    fn report_time(&self, token: SessionToken) {
        self.emit(
            token,
            DeviceSignal::TimeUpdated {
                current: self.elapsed().as_secs_f64(),
                total: self.total.map(|t| t.as_secs_f64()),
            },
        );
    }

    /// Periodic check for elapsed time and the natural end of the track.
    fn tick(&mut self) {
        let Some(drained) = self.sink.as_ref().map(Sink::empty) else {
            return;
        };
        self.on_tick(drained);
    }

    /// `drained` is whether the sink has run out of samples.
    fn on_tick(&mut self, drained: bool) {
        let Some(token) = self.token else {
            return;
        };
        if self.paused {
            return;
        }

        if drained {
            if !self.ended_sent {
                self.ended_sent = true;
                if let Some(st) = self.started_at.take() {
                    self.accumulated += st.elapsed();
                }
                self.paused = true;
                self.publish();
                self.emit(token, DeviceSignal::Ended);
            }
            return;
        }

        self.report_time(token);
    }

    fn fade_out(&mut self, fade_out_ms: u64) {
        let Some(sink) = self.sink.as_ref() else {
            return;
        };
        if !self.paused && fade_out_ms > 0 {
            let steps: u64 = 20;
            let step_ms = (fade_out_ms / steps).max(1);
            for step in 1..=steps {
                let t = step as f32 / steps as f32;
                sink.set_volume(1.0 - t);
                thread::sleep(Duration::from_millis(step_ms));
            }
        }
        sink.stop();
        self.paused = true;
        self.publish();
    }
}

pub(super) fn spawn_audio_thread(
    rx: Receiver<AudioCmd>,
    events: Sender<PlayerEvent>,
    status: StatusHandle,
    cache: PrefetchCache,
    settings: AudioSettings,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let stream = match OutputStreamBuilder::open_default_stream() {
            Ok(mut stream) => {
                // rodio logs to stderr when OutputStream is dropped. That's useful in debugging,
                // but noisy for a TUI app.
                stream.log_on_drop(false);
                Some(stream)
            }
            Err(e) => {
                log::error!("no audio output device: {e}");
                None
            }
        };

        let mut deck = Deck::new(stream, events, status, cache);

        let tick = Duration::from_millis(settings.tick_ms.max(1));
        loop {
            match rx.recv_timeout(tick) {
                Ok(cmd) => match cmd {
                    AudioCmd::Load { token, locator } => deck.load(token, locator),
                    AudioCmd::Play { token } => deck.play(token),
                    AudioCmd::Pause => deck.pause(),
                    AudioCmd::SeekTo(position) => deck.seek(position),
                    AudioCmd::Quit { fade_out_ms } => {
                        deck.fade_out(fade_out_ms);
                        break;
                    }
                },
                Err(RecvTimeoutError::Timeout) => deck.tick(),
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    })
}
