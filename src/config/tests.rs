use super::load::{default_config_path, resolve_config_path};
use super::schema::*;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK.get_or_init(|| Mutex::new(())).lock().unwrap()
}

/// Sets or clears one variable for the test's scope, restoring the previous
/// value on drop. Always taken together with `env_lock`.
struct ScopedEnv {
    key: &'static str,
    previous: Option<std::ffi::OsString>,
}

impl ScopedEnv {
    fn apply(key: &'static str, value: Option<&str>) -> Self {
        let previous = std::env::var_os(key);
        unsafe {
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
        Self { key, previous }
    }

    fn set(key: &'static str, value: &str) -> Self {
        Self::apply(key, Some(value))
    }

    fn unset(key: &'static str) -> Self {
        Self::apply(key, None)
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        unsafe {
            match self.previous.take() {
                Some(v) => std::env::set_var(self.key, v),
                None => std::env::remove_var(self.key),
            }
        }
    }
}

#[test]
fn resolve_config_path_prefers_adagio_config_path() {
    let _lock = env_lock();
    let _g1 = ScopedEnv::set("ADAGIO_CONFIG_PATH", "/tmp/adagio-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/adagio-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = ScopedEnv::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = ScopedEnv::set("HOME", "/tmp/home-should-not-win");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("adagio")
            .join("config.toml")
    );
}

#[test]
fn default_config_path_falls_back_to_home_dot_config() {
    let _lock = env_lock();
    let _g1 = ScopedEnv::unset("XDG_CONFIG_HOME");
    let _g2 = ScopedEnv::set("HOME", "/tmp/home-dir");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/home-dir")
            .join(".config")
            .join("adagio")
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
scan_roots = ["/music/archive", "/music/incoming"]

[audio]
fade_secs = 2.5
tick_rate = 20
volume = 0.4

[storage]
db_path = "/var/lib/adagio/catalog.db"
"#,
    )
    .unwrap();

    let _g1 = ScopedEnv::set("ADAGIO_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = ScopedEnv::unset("ADAGIO__AUDIO__TICK_RATE");

    let s = Settings::load().unwrap();
    assert_eq!(
        s.library.scan_roots,
        vec![
            std::path::PathBuf::from("/music/archive"),
            std::path::PathBuf::from("/music/incoming"),
        ]
    );
    assert_eq!(s.audio.fade_secs, 2.5);
    assert_eq!(s.audio.tick_rate, 20);
    assert_eq!(s.audio.volume, 0.4);
    assert_eq!(
        s.storage.db_path.as_deref(),
        Some(std::path::Path::new("/var/lib/adagio/catalog.db"))
    );
    assert_eq!(s.storage.snapshot_path, None);
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
tick_rate = 10
"#,
    )
    .unwrap();

    let _g1 = ScopedEnv::set("ADAGIO_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = ScopedEnv::set("ADAGIO__AUDIO__TICK_RATE", "30");

    let s = Settings::load().unwrap();
    assert_eq!(s.audio.tick_rate, 30);
}

#[test]
fn validate_rejects_out_of_range_settings() {
    let mut s = Settings::default();
    assert!(s.validate().is_ok());

    s.audio.tick_rate = 0;
    assert!(s.validate().is_err());
    s.audio.tick_rate = 10;

    s.audio.fade_secs = -1.0;
    assert!(s.validate().is_err());
    s.audio.fade_secs = 1.0;

    s.audio.volume = 1.5;
    assert!(s.validate().is_err());
}
