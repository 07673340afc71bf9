//! Audio-related small types and handles.
//!
//! Commands understood by the audio thread, the status it publishes, and the
//! in-memory cache shared with the prefetcher.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::player::SessionToken;

use super::prefetch::PrefetchStore;

#[derive(Debug)]
pub enum AudioCmd {
    /// Replace the current source; answered with readiness or an error.
    Load { token: SessionToken, locator: String },
    /// Start or resume the loaded source.
    Play { token: SessionToken },
    /// Pause playback (no-op when nothing plays).
    Pause,
    /// Jump to an absolute position in the current source.
    SeekTo(Duration),
    /// Quit the audio thread, optionally fading out over `fade_out_ms` milliseconds.
    Quit { fade_out_ms: u64 },
}

/// What the audio thread last reported about itself.
#[derive(Debug, Clone)]
pub struct DeviceStatus {
    /// Whether the output is paused (true until something plays).
    pub paused: bool,
}

impl Default for DeviceStatus {
    fn default() -> Self {
        Self { paused: true }
    }
}

pub type StatusHandle = Arc<Mutex<DeviceStatus>>;

/// Preloaded files shared between the prefetcher and the audio thread.
pub type PrefetchCache = Arc<Mutex<PrefetchStore>>;
