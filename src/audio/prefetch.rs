use std::collections::HashMap;
use std::fs;
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::thread;

use crate::player::{PlayerEvent, Prefetcher};

use super::types::PrefetchCache;

/// Fully read files keyed by locator, holding at most `capacity` of them.
///
/// A full store turns new files away instead of evicting: the preload chain
/// fills nearest-first, so what is already held is what plays soonest. Room
/// is made by [`PrefetchStore::retain`] when the current story changes.
#[derive(Debug)]
pub struct PrefetchStore {
    entries: HashMap<String, Arc<[u8]>>,
    capacity: usize,
}

impl PrefetchStore {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity,
        }
    }

    pub fn get(&self, locator: &str) -> Option<&Arc<[u8]>> {
        self.entries.get(locator)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    /// Store `bytes`; returns false when the store is full and `locator` is
    /// not already held.
    pub fn insert(&mut self, locator: String, bytes: Arc<[u8]>) -> bool {
        if self.is_full() && !self.entries.contains_key(&locator) {
            return false;
        }
        self.entries.insert(locator, bytes);
        true
    }

    /// Drop every entry not named in `keep`.
    pub fn retain(&mut self, keep: &[&str]) {
        self.entries.retain(|locator, _| keep.contains(&locator.as_str()));
    }
}

pub fn new_cache(capacity: usize) -> PrefetchCache {
    Arc::new(Mutex::new(PrefetchStore::with_capacity(capacity)))
}

/// Reads upcoming files into the shared cache on a background thread.
///
/// The audio thread decodes from that cache, so switching to a preloaded
/// story skips the disk entirely.
pub struct FilePrefetcher {
    cache: PrefetchCache,
    events: Sender<PlayerEvent>,
}

impl FilePrefetcher {
    pub fn new(cache: PrefetchCache, events: Sender<PlayerEvent>) -> Self {
        Self { cache, events }
    }
}

impl Prefetcher for FilePrefetcher {
    fn prefetch(&mut self, index: usize, locator: &str) {
        let cache = self.cache.clone();
        let events = self.events.clone();
        let locator = locator.to_string();

        thread::spawn(move || {
            // A full cache ends the chain here; it resumes from the next
            // story once the current one changes and frees room.
            if cache.lock().map(|c| c.is_full()).unwrap_or(true) {
                log::debug!("{locator}: preload cache full");
                let _ = events.send(PlayerEvent::PreloadFailed(index));
                return;
            }

            let event = match fs::read(&locator) {
                Ok(bytes) => {
                    let bytes: Arc<[u8]> = Arc::from(bytes);
                    let stored = cache
                        .lock()
                        .map(|mut c| c.insert(locator.clone(), bytes))
                        .unwrap_or(false);
                    if stored {
                        PlayerEvent::PreloadReady(index)
                    } else {
                        log::debug!("{locator}: preload cache filled up meanwhile");
                        PlayerEvent::PreloadFailed(index)
                    }
                }
                Err(e) => {
                    log::warn!("{locator}: {e}");
                    PlayerEvent::PreloadFailed(index)
                }
            };
            let _ = events.send(event);
        });
    }

    fn retain(&mut self, keep: &[&str]) {
        if let Ok(mut c) = self.cache.lock() {
            c.retain(keep);
            if c.is_empty() {
                log::debug!("preload cache cleared");
            } else {
                log::debug!("preload cache holds {} file(s)", c.len());
            }
        }
    }
}
