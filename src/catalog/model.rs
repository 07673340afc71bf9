use std::path::Path;

use super::title::title_from_filename;

/// What is known about a track's length.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub enum DurationState {
    /// Nobody asked yet.
    #[default]
    Unknown,
    /// A metadata probe is in flight.
    Probing,
    /// Length in seconds.
    Known(f64),
    /// Probing failed; terminal until the catalog is rebuilt.
    Unavailable,
}

impl DurationState {
    pub fn seconds(&self) -> Option<f64> {
        match self {
            Self::Known(s) => Some(*s),
            _ => None,
        }
    }
}

/// One entry of the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackDescriptor {
    pub title: String,
    /// Where the playback device and the probes find the audio.
    pub locator: String,
    pub duration: DurationState,
    /// Enough data is buffered to play through without stalling.
    pub ready: bool,
}

impl TrackDescriptor {
    pub fn new(title: impl Into<String>, locator: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            locator: locator.into(),
            duration: DurationState::Unknown,
            ready: false,
        }
    }
}

/// Ordered set of tracks for one session.
///
/// Membership and order are fixed at construction; only the per-entry
/// `duration` and `ready` fields change afterwards.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tracks: Vec<TrackDescriptor>,
}

impl Catalog {
    /// Build a catalog from listing filenames relative to `base_dir`, sorted by
    /// title (case-insensitive).
    pub fn build<S: AsRef<str>>(base_dir: &Path, filenames: &[S]) -> Self {
        let tracks = filenames
            .iter()
            .map(|name| {
                let name = name.as_ref();
                let locator = base_dir.join(name).to_string_lossy().into_owned();
                TrackDescriptor::new(title_from_filename(name), locator)
            })
            .collect();
        Self::from_tracks(tracks)
    }

    /// Wrap already-built descriptors, sorting them by title.
    pub fn from_tracks(mut tracks: Vec<TrackDescriptor>) -> Self {
        tracks.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()));
        Self { tracks }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TrackDescriptor> {
        self.tracks.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut TrackDescriptor> {
        self.tracks.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackDescriptor> {
        self.tracks.iter()
    }

    /// Map any index onto the catalog cyclically: below zero goes to the last
    /// entry, past the end goes to the first.
    pub fn wrap_index(&self, index: isize) -> Option<usize> {
        if self.tracks.is_empty() {
            return None;
        }
        let len = self.tracks.len() as isize;
        let i = if index < 0 {
            len - 1
        } else if index >= len {
            0
        } else {
            index
        };
        Some(i as usize)
    }
}
