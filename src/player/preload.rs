//! Forward-only, one-at-a-time buffering of upcoming tracks.

use crate::catalog::Catalog;

use super::device::Prefetcher;

/// Chains background loads so that at most one is in flight.
///
/// Each completed load marks its entry ready and moves on to the next index;
/// the chain stops at the end of the catalog or at an entry that is already
/// ready. Playback state is never touched here.
#[derive(Debug)]
pub struct Preloader {
    enabled: bool,
    in_flight: Option<usize>,
    queued: Option<usize>,
}

impl Preloader {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            in_flight: None,
            queued: None,
        }
    }

    pub fn in_flight(&self) -> Option<usize> {
        self.in_flight
    }

    /// Ask for `index` to be buffered.
    ///
    /// While another load is running the request is remembered (the latest
    /// one wins) and picked up when the slot frees.
    pub fn preload(&mut self, index: usize, catalog: &Catalog, prefetcher: &mut impl Prefetcher) {
        if !self.enabled {
            return;
        }
        let Some(track) = catalog.get(index) else {
            return;
        };
        if track.ready {
            return;
        }
        if let Some(busy) = self.in_flight {
            if busy != index {
                self.queued = Some(index);
            }
            return;
        }

        log::debug!("preloading #{index} {}", track.locator);
        self.in_flight = Some(index);
        prefetcher.prefetch(index, &track.locator);
    }

    /// The background load for `index` buffered enough to play through.
    pub fn on_ready(&mut self, index: usize, catalog: &mut Catalog, prefetcher: &mut impl Prefetcher) {
        if self.in_flight != Some(index) {
            log::debug!("ignoring preload signal for #{index}, not in flight");
            return;
        }
        self.in_flight = None;
        if let Some(track) = catalog.get_mut(index) {
            track.ready = true;
        }

        let next = self.queued.take().unwrap_or(index + 1);
        self.preload(next, catalog, prefetcher);
    }

    /// The background load for `index` failed. The entry stays unready and the
    /// chain only continues with an explicitly queued request.
    pub fn on_failed(&mut self, index: usize, catalog: &Catalog, prefetcher: &mut impl Prefetcher) {
        if self.in_flight != Some(index) {
            return;
        }
        log::warn!("preload of #{index} failed");
        self.in_flight = None;
        if let Some(next) = self.queued.take() {
            self.preload(next, catalog, prefetcher);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        requests: Vec<usize>,
    }

    impl Prefetcher for Recorder {
        fn prefetch(&mut self, index: usize, _locator: &str) {
            self.requests.push(index);
        }

        fn retain(&mut self, _keep: &[&str]) {}
    }

    fn catalog(n: usize) -> Catalog {
        let names: Vec<String> = (0..n).map(|i| format!("story-{i}.mp3")).collect();
        Catalog::build(Path::new("."), &names)
    }

    #[test]
    fn chains_forward_one_at_a_time() {
        let mut cat = catalog(3);
        let mut rec = Recorder::default();
        let mut pre = Preloader::new(true);

        pre.preload(0, &cat, &mut rec);
        pre.preload(1, &cat, &mut rec);
        assert_eq!(rec.requests, vec![0]);
        assert_eq!(pre.in_flight(), Some(0));

        pre.on_ready(0, &mut cat, &mut rec);
        assert!(cat.get(0).unwrap().ready);
        assert_eq!(rec.requests, vec![0, 1]);

        pre.on_ready(1, &mut cat, &mut rec);
        pre.on_ready(2, &mut cat, &mut rec);
        assert_eq!(rec.requests, vec![0, 1, 2]);
        assert_eq!(pre.in_flight(), None);
        assert!(cat.iter().all(|t| t.ready));
    }

    #[test]
    fn ready_entry_and_out_of_bounds_are_no_ops() {
        let mut cat = catalog(2);
        cat.get_mut(1).unwrap().ready = true;
        let mut rec = Recorder::default();
        let mut pre = Preloader::new(true);

        pre.preload(1, &cat, &mut rec);
        pre.preload(7, &cat, &mut rec);
        assert!(rec.requests.is_empty());
        assert_eq!(pre.in_flight(), None);
    }

    #[test]
    fn chain_stops_at_ready_entry() {
        let mut cat = catalog(3);
        cat.get_mut(1).unwrap().ready = true;
        let mut rec = Recorder::default();
        let mut pre = Preloader::new(true);

        pre.preload(0, &cat, &mut rec);
        pre.on_ready(0, &mut cat, &mut rec);
        assert_eq!(rec.requests, vec![0]);
        assert!(!cat.get(2).unwrap().ready);
    }

    #[test]
    fn queued_request_wins_over_chain() {
        let mut cat = catalog(5);
        let mut rec = Recorder::default();
        let mut pre = Preloader::new(true);

        pre.preload(0, &cat, &mut rec);
        pre.preload(3, &cat, &mut rec);
        pre.on_ready(0, &mut cat, &mut rec);
        assert_eq!(rec.requests, vec![0, 3]);
    }

    #[test]
    fn failure_frees_the_slot_without_marking_ready() {
        let mut cat = catalog(3);
        let mut rec = Recorder::default();
        let mut pre = Preloader::new(true);

        pre.preload(0, &cat, &mut rec);
        pre.on_failed(0, &cat, &mut rec);
        assert!(!cat.get(0).unwrap().ready);
        assert_eq!(pre.in_flight(), None);
        assert_eq!(rec.requests, vec![0]);

        pre.preload(2, &cat, &mut rec);
        assert_eq!(rec.requests, vec![0, 2]);
    }

    #[test]
    fn stray_signal_is_ignored() {
        let mut cat = catalog(3);
        let mut rec = Recorder::default();
        let mut pre = Preloader::new(true);

        pre.preload(0, &cat, &mut rec);
        pre.on_ready(2, &mut cat, &mut rec);
        assert!(!cat.get(2).unwrap().ready);
        assert_eq!(pre.in_flight(), Some(0));
    }

    #[test]
    fn disabled_preloader_does_nothing() {
        let cat = catalog(2);
        let mut rec = Recorder::default();
        let mut pre = Preloader::new(false);
        pre.preload(0, &cat, &mut rec);
        assert!(rec.requests.is_empty());
    }
}
