//! Learns every track's duration up front through metadata-only probes.

use crate::catalog::{Catalog, DurationState};
use crate::error::ProbeError;

use super::device::MetadataProbe;

/// Fire-and-forget duration probing for the whole catalog.
///
/// Probes run in parallel and finish in any order. A failure is terminal for
/// that entry; there is no retry.
pub struct DurationResolver;

impl DurationResolver {
    /// Probe every entry whose duration nobody has asked about yet.
    pub fn start(catalog: &mut Catalog, probe: &mut impl MetadataProbe) -> usize {
        let mut issued = 0;
        for index in 0..catalog.len() {
            let Some(track) = catalog.get_mut(index) else {
                continue;
            };
            if track.duration != DurationState::Unknown {
                continue;
            }
            track.duration = DurationState::Probing;
            probe.probe(index, &track.locator);
            issued += 1;
        }
        log::debug!("issued {issued} duration probes");
        issued
    }

    /// Record a probe result. Returns whether the entry changed.
    ///
    /// A duration already reported by the playback device is kept.
    pub fn apply(catalog: &mut Catalog, index: usize, result: Result<f64, ProbeError>) -> bool {
        let Some(track) = catalog.get_mut(index) else {
            return false;
        };
        if matches!(track.duration, DurationState::Known(_)) {
            return false;
        }

        let next = match result {
            Ok(seconds) if seconds.is_finite() && seconds > 0.0 => DurationState::Known(seconds),
            Ok(seconds) => {
                log::warn!("{}: probe reported unusable duration {seconds}", track.locator);
                DurationState::Unavailable
            }
            Err(e) => {
                log::warn!("{}: {e}", track.locator);
                DurationState::Unavailable
            }
        };
        let changed = track.duration != next;
        track.duration = next;
        changed
    }
}
