//! Utilities for turning a locator into a `rodio` sink.
//!
//! Sources are decoded from memory: either bytes the prefetcher already
//! cached, or the file read on the spot.

use std::fs;
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use rodio::{Decoder, OutputStream, Sink, Source};

use crate::error::LoadError;

use super::types::PrefetchCache;

pub(super) type MemorySource = Decoder<Cursor<Arc<[u8]>>>;

fn read_bytes(locator: &str, cache: &PrefetchCache) -> Result<Arc<[u8]>, LoadError> {
    if let Some(bytes) = cache.lock().ok().and_then(|c| c.get(locator).cloned()) {
        log::debug!("{locator}: using preloaded bytes");
        return Ok(bytes);
    }
    let bytes = fs::read(locator).map_err(|source| LoadError::Open {
        locator: locator.to_string(),
        source,
    })?;
    Ok(Arc::from(bytes))
}

/// Open and decode `locator`, preferring preloaded bytes.
pub(super) fn open_source(locator: &str, cache: &PrefetchCache) -> Result<MemorySource, LoadError> {
    let bytes = read_bytes(locator, cache)?;
    Decoder::new(Cursor::new(bytes)).map_err(|e| LoadError::Decode {
        locator: locator.to_string(),
        reason: e.to_string(),
    })
}

/// Create a paused `Sink` playing `source` from `start_at`.
pub(super) fn create_sink_at(stream: &OutputStream, source: MemorySource, start_at: Duration) -> Sink {
    let sink = Sink::connect_new(stream.mixer());
    // `skip_duration` is our seeking primitive; even Duration::ZERO is fine.
    sink.append(source.skip_duration(start_at));
    sink.pause();
    sink
}
