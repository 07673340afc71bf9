//! Playback core: the controller state machine and its helpers.
//!
//! `controller` owns the playback flags and the single device; `preload`
//! buffers upcoming tracks one at a time; `resolver` learns durations through
//! metadata probes; `progress` formats the timeline; `device` defines the
//! seams to the code doing the actual I/O.

mod controller;
mod device;
mod preload;
mod progress;
mod resolver;

pub use controller::*;
pub use device::*;
pub use preload::Preloader;
pub use progress::{Progress, format_clock, report_time, seek_from_pointer};
pub use resolver::DurationResolver;
