use std::fs;
use std::sync::Arc;
use std::sync::mpsc;
use std::time::Duration;

use tempfile::tempdir;

use super::prefetch::PrefetchStore;
use super::sink::open_source;
use super::*;
use crate::error::{LoadError, ProbeError};
use crate::player::{MetadataProbe, PlayerEvent, Prefetcher};

const WAIT: Duration = Duration::from_secs(5);

#[test]
fn prefetcher_caches_file_and_reports_ready() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("story.mp3");
    fs::write(&path, b"some bytes").unwrap();
    let locator = path.to_string_lossy().into_owned();

    let cache = new_cache(2);
    let (tx, rx) = mpsc::channel();
    let mut prefetcher = FilePrefetcher::new(cache.clone(), tx);
    prefetcher.prefetch(3, &locator);

    assert_eq!(rx.recv_timeout(WAIT).unwrap(), PlayerEvent::PreloadReady(3));
    let cached = cache.lock().unwrap().get(&locator).cloned().unwrap();
    assert_eq!(&cached[..], b"some bytes");
}

#[test]
fn prefetcher_reports_missing_file() {
    let dir = tempdir().unwrap();
    let locator = dir.path().join("gone.mp3").to_string_lossy().into_owned();

    let cache = new_cache(2);
    let (tx, rx) = mpsc::channel();
    FilePrefetcher::new(cache.clone(), tx).prefetch(1, &locator);

    assert_eq!(rx.recv_timeout(WAIT).unwrap(), PlayerEvent::PreloadFailed(1));
    assert!(cache.lock().unwrap().is_empty());
}

#[test]
fn probe_duration_rejects_non_audio() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("fake.txt");
    fs::write(&path, b"definitely not audio").unwrap();
    let locator = path.to_string_lossy().into_owned();

    assert_eq!(
        probe_duration(&locator),
        Err(ProbeError::Unreadable(locator.clone()))
    );
}

#[test]
fn lofty_probe_sends_result_for_its_index() {
    let dir = tempdir().unwrap();
    let locator = dir.path().join("missing.mp3").to_string_lossy().into_owned();

    let (tx, rx) = mpsc::channel();
    LoftyProbe::new(tx).probe(4, &locator);

    match rx.recv_timeout(WAIT).unwrap() {
        PlayerEvent::Probed { index, result } => {
            assert_eq!(index, 4);
            assert!(result.is_err());
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn open_source_reports_missing_file() {
    let dir = tempdir().unwrap();
    let locator = dir.path().join("missing.mp3").to_string_lossy().into_owned();
    assert!(matches!(
        open_source(&locator, &new_cache(2)),
        Err(LoadError::Open { .. })
    ));
}

#[test]
fn open_source_prefers_cached_bytes() {
    // Nothing exists on disk; the decode error proves the cache was read.
    let cache = new_cache(2);
    let bytes: Arc<[u8]> = Arc::from(&b"garbage"[..]);
    cache
        .lock()
        .unwrap()
        .insert("/nowhere/story.mp3".to_string(), bytes);

    assert!(matches!(
        open_source("/nowhere/story.mp3", &cache),
        Err(LoadError::Decode { .. })
    ));
}

#[test]
fn device_status_starts_paused() {
    assert!(DeviceStatus::default().paused);
}

fn story_files(dir: &std::path::Path, n: usize) -> Vec<String> {
    (0..n)
        .map(|i| {
            let path = dir.join(format!("story-{i}.mp3"));
            fs::write(&path, vec![i as u8; 64]).unwrap();
            path.to_string_lossy().into_owned()
        })
        .collect()
}

#[test]
fn preload_cache_stays_bounded_across_the_catalog() {
    let dir = tempdir().unwrap();
    let files = story_files(dir.path(), 6);
    let cache = new_cache(2);
    let (tx, rx) = mpsc::channel();
    let mut prefetcher = FilePrefetcher::new(cache.clone(), tx);

    // Walk the whole catalog the way the preload chain does, one at a time.
    let mut outcomes = Vec::new();
    for (i, locator) in files.iter().enumerate().skip(1) {
        prefetcher.prefetch(i, locator);
        outcomes.push(rx.recv_timeout(WAIT).unwrap());
    }
    assert_eq!(
        outcomes,
        vec![
            PlayerEvent::PreloadReady(1),
            PlayerEvent::PreloadReady(2),
            PlayerEvent::PreloadFailed(3),
            PlayerEvent::PreloadFailed(4),
            PlayerEvent::PreloadFailed(5),
        ]
    );
    assert_eq!(cache.lock().unwrap().len(), 2);

    // Moving on to story 2 frees story 1 and makes room for story 3.
    prefetcher.retain(&[files[2].as_str(), files[3].as_str()]);
    assert_eq!(cache.lock().unwrap().len(), 1);
    prefetcher.prefetch(3, &files[3]);
    assert_eq!(rx.recv_timeout(WAIT).unwrap(), PlayerEvent::PreloadReady(3));

    let store = cache.lock().unwrap();
    assert_eq!(store.len(), 2);
    assert!(store.get(&files[1]).is_none());
    assert_eq!(&store.get(&files[3]).unwrap()[..], &[3u8; 64][..]);
}

#[test]
fn full_store_refuses_new_locators_but_replaces_held_ones() {
    let mut store = PrefetchStore::with_capacity(1);
    let bytes: Arc<[u8]> = Arc::from(&b"one"[..]);
    assert!(store.insert("a".to_string(), bytes.clone()));
    assert!(store.is_full());
    assert!(!store.insert("b".to_string(), bytes));
    assert!(store.insert("a".to_string(), Arc::from(&b"two"[..])));
    assert_eq!(&store.get("a").unwrap()[..], b"two");

    store.retain(&[]);
    assert!(store.is_empty());
}

#[test]
fn lofty_probe_answers_every_request_from_one_worker() {
    let dir = tempdir().unwrap();
    let files = story_files(dir.path(), 4);
    let (tx, rx) = mpsc::channel();
    let mut probe = LoftyProbe::new(tx);
    for (i, locator) in files.iter().enumerate() {
        probe.probe(i, locator);
    }
    drop(probe);

    let mut answered: Vec<usize> = rx
        .iter()
        .map(|event| match event {
            PlayerEvent::Probed { index, result } => {
                assert!(result.is_err());
                index
            }
            other => panic!("unexpected event {other:?}"),
        })
        .collect();
    answered.sort_unstable();
    assert_eq!(answered, vec![0, 1, 2, 3]);
}
