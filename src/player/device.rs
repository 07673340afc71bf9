//! Seams between the controller and the things that do real I/O.
//!
//! Commands go out through the traits below and return immediately. Results
//! come back later as [`PlayerEvent`]s, which the runtime feeds to
//! `Controller::handle` on the controller's own thread.

use crate::error::ProbeError;

/// Identifies one load request issued to the playback device.
///
/// Every device signal carries the token of the load it belongs to; signals
/// with an older token are stale and get dropped.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SessionToken(pub u64);

impl SessionToken {
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Result of asking the device to start playing.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayOutcome {
    Started,
    /// The device refused (no source, output unavailable, ...).
    Rejected(String),
}

/// The single audio output owned by the controller.
pub trait PlaybackDevice {
    /// Replace the current source. Answered with `MetadataLoaded`,
    /// `ReadyToPlayThrough` or `Error` tagged with `token`.
    fn load(&mut self, token: SessionToken, locator: &str);
    /// Answered with `PlayOutcome`.
    fn play(&mut self, token: SessionToken);
    fn pause(&mut self);
    fn set_current_time(&mut self, seconds: f64);
    /// What the device itself reports, independent of the user's intent.
    fn is_paused(&self) -> bool;
}

/// Background buffering of tracks that are not playing yet.
pub trait Prefetcher {
    /// Answered with `PreloadReady(index)` or `PreloadFailed(index)`.
    fn prefetch(&mut self, index: usize, locator: &str);
    /// Release buffered data for every locator not in `keep`.
    fn retain(&mut self, keep: &[&str]);
}

/// Metadata-only inspection used to learn durations.
pub trait MetadataProbe {
    /// Answered with `Probed { index, .. }`.
    fn probe(&mut self, index: usize, locator: &str);
}

/// Signals from the playback device for one load session.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceSignal {
    MetadataLoaded(f64),
    ReadyToPlayThrough,
    TimeUpdated { current: f64, total: Option<f64> },
    Ended,
    Error(String),
    PlayOutcome(PlayOutcome),
}

/// Everything that can arrive asynchronously at the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    Device {
        token: SessionToken,
        signal: DeviceSignal,
    },
    PreloadReady(usize),
    PreloadFailed(usize),
    Probed {
        index: usize,
        result: Result<f64, ProbeError>,
    },
}
