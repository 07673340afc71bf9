use super::load::{default_config_path, resolve_config_path};
use super::schema::*;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn resolve_config_path_prefers_tales_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("TALES_CONFIG_PATH", "/tmp/tales-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/tales-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    assert_eq!(
        default_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("tales")
            .join("config.toml")
    );
}

#[test]
fn default_config_path_falls_back_to_home_dot_config() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    assert_eq!(
        default_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/home-dir")
            .join(".config")
            .join("tales")
            .join("config.toml")
    );
}

#[test]
fn settings_load_from_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[library]
stories_dir = "/srv/bedtime"
manifest_name = "index.json"
extensions = ["mp3"]
recursive = false

[playback]
autoplay = true
preload = false
preload_capacity = 5

[audio]
tick_ms = 100
quit_fade_out_ms = 0

[ui]
header_text = "hello"
follow_playback = false

[controls]
scrub_seconds = 30

[logging]
level = "debug"
file = "/tmp/tales.log"
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("TALES_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("TALES__AUDIO__TICK_MS");

    let s = Settings::load().unwrap();
    assert_eq!(s.library.stories_dir, "/srv/bedtime");
    assert_eq!(s.library.manifest_name, "index.json");
    assert_eq!(s.library.extensions, vec!["mp3".to_string()]);
    assert!(!s.library.recursive);
    assert!(s.library.include_hidden);
    assert!(s.playback.autoplay);
    assert!(!s.playback.preload);
    assert_eq!(s.playback.preload_capacity, 5);
    assert_eq!(s.audio.tick_ms, 100);
    assert_eq!(s.audio.quit_fade_out_ms, 0);
    assert_eq!(s.ui.header_text, "hello");
    assert!(!s.ui.follow_playback);
    assert_eq!(s.controls.scrub_seconds, 30);
    assert_eq!(s.logging.level, "debug");
    assert_eq!(s.logging.file, "/tmp/tales.log");
    assert!(s.validate().is_ok());
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[audio]
tick_ms = 250
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("TALES_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("TALES__AUDIO__TICK_MS", "50");

    let s = Settings::load().unwrap();
    assert_eq!(s.audio.tick_ms, 50);
}

#[test]
fn validate_rejects_zero_tick_and_unknown_level() {
    let mut s = Settings::default();
    assert!(s.validate().is_ok());

    s.audio.tick_ms = 0;
    assert!(s.validate().is_err());

    s.audio.tick_ms = 200;
    s.logging.level = "chatty".to_string();
    assert!(s.validate().is_err());

    s.logging.level = "warn".to_string();
    s.library.extensions = vec!["  ".to_string()];
    assert!(s.validate().is_err());
}

#[test]
fn validate_rejects_zero_preload_capacity() {
    let mut s = Settings::default();
    assert_eq!(s.playback.preload_capacity, 3);
    s.playback.preload_capacity = 0;
    assert!(s.validate().is_err());
}
