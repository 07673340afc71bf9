//! Error kinds surfaced at the boundaries of the player.
//!
//! None of these escape the controller: each one is turned into local state
//! (a status message, an "Unavailable" label, a paused icon) where it arrives.

use std::path::PathBuf;

/// Reading the story listing failed.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed listing {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A metadata-only probe could not determine a track's duration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProbeError {
    #[error("could not read {0}")]
    Unreadable(String),

    #[error("no usable duration in {0}")]
    NoDuration(String),
}

/// The playback device could not open or decode the current track.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to open {locator}: {source}")]
    Open {
        locator: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {locator}: {reason}")]
    Decode { locator: String, reason: String },
}
