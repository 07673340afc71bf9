use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::config::AudioSettings;
use crate::player::{PlaybackDevice, PlayerEvent, SessionToken};

use super::thread::spawn_audio_thread;
use super::types::{AudioCmd, DeviceStatus, PrefetchCache, StatusHandle};

/// Handle to the audio thread; the controller's playback device.
pub struct AudioPlayer {
    tx: Sender<AudioCmd>,
    status: StatusHandle,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl AudioPlayer {
    pub fn new(events: Sender<PlayerEvent>, cache: PrefetchCache, settings: AudioSettings) -> Self {
        let (tx, rx) = mpsc::channel::<AudioCmd>();
        let status: StatusHandle = Arc::new(Mutex::new(DeviceStatus::default()));

        let audio_handle = spawn_audio_thread(rx, events, status.clone(), cache, settings);

        Self {
            tx,
            status,
            join: Mutex::new(Some(audio_handle)),
        }
    }

    pub fn send(&self, cmd: AudioCmd) -> Result<(), mpsc::SendError<AudioCmd>> {
        self.tx.send(cmd)
    }

    fn send_or_log(&self, cmd: AudioCmd) {
        if let Err(e) = self.send(cmd) {
            log::error!("audio thread is gone, dropped {:?}", e.0);
        }
    }

    pub fn quit_softly(&self, fade_out: Duration) {
        let _ = self.send(AudioCmd::Quit {
            fade_out_ms: fade_out.as_millis() as u64,
        });

        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }
}

impl PlaybackDevice for AudioPlayer {
    fn load(&mut self, token: SessionToken, locator: &str) {
        self.send_or_log(AudioCmd::Load {
            token,
            locator: locator.to_string(),
        });
    }

    fn play(&mut self, token: SessionToken) {
        self.send_or_log(AudioCmd::Play { token });
    }

    fn pause(&mut self) {
        self.send_or_log(AudioCmd::Pause);
    }

    fn set_current_time(&mut self, seconds: f64) {
        let position = Duration::try_from_secs_f64(seconds.max(0.0)).unwrap_or(Duration::ZERO);
        self.send_or_log(AudioCmd::SeekTo(position));
    }

    fn is_paused(&self) -> bool {
        self.status.lock().map(|s| s.paused).unwrap_or(true)
    }
}
