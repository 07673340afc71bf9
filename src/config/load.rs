use std::{env, path::PathBuf, str::FromStr};

use super::schema::Settings;

const ENV_PREFIX: &str = "TALES";
const PATH_OVERRIDE: &str = "TALES_CONFIG_PATH";

impl Settings {
    /// Build the settings tree in three layers: struct defaults, then the
    /// config file when one exists, then `TALES__SECTION__KEY` variables.
    ///
    /// A missing file is fine; a file that fails to parse is an error the
    /// caller decides how to report.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let mut layers = ::config::Config::builder();
        if let Some(path) = resolve_config_path() {
            layers = layers.add_source(::config::File::from(path.as_path()).required(false));
        }

        layers
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Reject values the player cannot run with.
    pub fn validate(&self) -> Result<(), String> {
        if self.audio.tick_ms == 0 {
            return Err("audio.tick_ms must be >= 1".to_string());
        }
        if self.playback.preload_capacity == 0 {
            return Err(
                "playback.preload_capacity must be >= 1 (set playback.preload = false to disable)"
                    .to_string(),
            );
        }
        if self.library.extensions.iter().all(|e| e.trim().is_empty()) {
            return Err("library.extensions must name at least one extension".to_string());
        }
        if log::LevelFilter::from_str(&self.logging.level).is_err() {
            return Err(format!("logging.level: unknown level {:?}", self.logging.level));
        }
        Ok(())
    }
}

/// `TALES_CONFIG_PATH` wins outright; otherwise the per-user location.
pub fn resolve_config_path() -> Option<PathBuf> {
    env::var_os(PATH_OVERRIDE)
        .map(PathBuf::from)
        .or_else(default_config_path)
}

/// `tales/config.toml` under the XDG config home, which defaults to
/// `~/.config`.
pub fn default_config_path() -> Option<PathBuf> {
    env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
        .map(|dir| dir.join("tales").join("config.toml"))
}
