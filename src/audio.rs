//! The concrete playback device and its background helpers.
//!
//! `AudioPlayer` forwards commands to a dedicated thread that owns the rodio
//! output; `FilePrefetcher` fills an in-memory cache the thread decodes from;
//! `LoftyProbe` reads durations from file headers. All three answer through
//! the same `PlayerEvent` channel.

mod player;
mod prefetch;
mod probe;
mod sink;
mod thread;
mod types;

pub use player::AudioPlayer;
pub use prefetch::{FilePrefetcher, new_cache};
pub use probe::{LoftyProbe, probe_duration};
pub use types::*;

#[cfg(test)]
mod tests;
