use std::fs::File;
use std::str::FromStr;

use simplelog::{CombinedLogger, Config, LevelFilter, WriteLogger};

use crate::config;

pub fn load_settings() -> config::Settings {
    match config::Settings::load() {
        Ok(s) => {
            if let Err(msg) = s.validate() {
                eprintln!("tales: invalid config, using defaults: {msg}");
                config::Settings::default()
            } else {
                s
            }
        }
        Err(e) => {
            // Config is optional; failures should not prevent the app from starting.
            eprintln!("tales: failed to load config, using defaults: {e}");
            config::Settings::default()
        }
    }
}

/// Install a file logger. The terminal belongs to the UI, so nothing is
/// logged unless `logging.file` names a path.
pub fn init_logging(settings: &config::LoggingSettings) -> Result<(), Box<dyn std::error::Error>> {
    if settings.file.trim().is_empty() {
        return Ok(());
    }
    let level = LevelFilter::from_str(&settings.level).unwrap_or(LevelFilter::Info);
    CombinedLogger::init(vec![WriteLogger::new(
        level,
        Config::default(),
        File::create(&settings.file)?,
    )])?;
    Ok(())
}
