use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use walkdir::WalkDir;

use crate::config::LibrarySettings;
use crate::error::CatalogError;

/// Where the list of story files comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    /// A JSON listing (`{"files": [...]}`); entries are relative to its directory.
    Manifest(PathBuf),
    /// No listing: scan the directory for audio files.
    Directory(PathBuf),
}

impl CatalogSource {
    /// Prefer a manifest named `manifest_name` inside `dir`, otherwise scan `dir`.
    pub fn resolve(dir: &Path, manifest_name: &str) -> Self {
        let manifest = dir.join(manifest_name);
        if !manifest_name.is_empty() && manifest.is_file() {
            Self::Manifest(manifest)
        } else {
            Self::Directory(dir.to_path_buf())
        }
    }

    /// Directory the listed filenames are relative to.
    pub fn base_dir(&self) -> PathBuf {
        match self {
            Self::Manifest(p) => p.parent().map(Path::to_path_buf).unwrap_or_default(),
            Self::Directory(d) => d.clone(),
        }
    }
}

/// Shape of the listing file.
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    pub files: Vec<String>,
}

/// Fetch the filenames making up the catalog, in listing order.
pub fn fetch_catalog(
    source: &CatalogSource,
    settings: &LibrarySettings,
) -> Result<Vec<String>, CatalogError> {
    match source {
        CatalogSource::Manifest(path) => read_manifest(path),
        CatalogSource::Directory(dir) => list_directory(dir, settings),
    }
}

pub(crate) fn read_manifest(path: &Path) -> Result<Vec<String>, CatalogError> {
    let raw = fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let manifest: Manifest =
        serde_json::from_str(&raw).map_err(|source| CatalogError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;
    log::info!("{}: {} entries", path.display(), manifest.files.len());
    Ok(manifest.files)
}

fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// List audio files under `dir` as paths relative to it.
pub(crate) fn list_directory(
    dir: &Path,
    settings: &LibrarySettings,
) -> Result<Vec<String>, CatalogError> {
    fs::read_dir(dir).map_err(|source| CatalogError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);
    if !settings.recursive {
        walker = walker.max_depth(1);
    }

    let files: Vec<String> = walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file() && is_audio_file(e.path(), settings))
        .filter_map(|e| {
            e.path()
                .strip_prefix(dir)
                .ok()
                .map(|rel| rel.to_string_lossy().into_owned())
        })
        .collect();

    log::info!("{}: found {} audio files", dir.display(), files.len());
    Ok(files)
}
