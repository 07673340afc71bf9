use std::sync::mpsc::{self, Sender};
use std::thread;

use lofty::file::AudioFile;

use crate::error::ProbeError;
use crate::player::{MetadataProbe, PlayerEvent};

/// Read a file's duration from its headers without decoding audio.
pub fn probe_duration(locator: &str) -> Result<f64, ProbeError> {
    let tagged =
        lofty::read_from_path(locator).map_err(|_| ProbeError::Unreadable(locator.to_string()))?;
    let duration = tagged.properties().duration();
    if duration.is_zero() {
        return Err(ProbeError::NoDuration(locator.to_string()));
    }
    Ok(duration.as_secs_f64())
}

/// Probes files one after another on a single background worker.
///
/// The worker exits once the probe is dropped and its queue is drained.
pub struct LoftyProbe {
    jobs: Sender<(usize, String)>,
}

impl LoftyProbe {
    pub fn new(events: Sender<PlayerEvent>) -> Self {
        let (jobs, queue) = mpsc::channel::<(usize, String)>();
        thread::spawn(move || {
            for (index, locator) in queue {
                let result = probe_duration(&locator);
                if events.send(PlayerEvent::Probed { index, result }).is_err() {
                    break;
                }
            }
        });
        Self { jobs }
    }
}

impl MetadataProbe for LoftyProbe {
    fn probe(&mut self, index: usize, locator: &str) {
        if self.jobs.send((index, locator.to_string())).is_err() {
            log::warn!("probe worker is gone, {locator} stays unprobed");
        }
    }
}
