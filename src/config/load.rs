use std::{env, path::PathBuf};

use tracing::warn;

use super::schema::Settings;

/// Configuration loading helpers.
///
/// `Settings::load` tries environment variables first (prefix `ADAGIO__`),
/// then an optional config file and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let mut builder = ::config::Config::builder();
        if let Some(path) = resolve_config_path() {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }
        builder
            .add_source(
                ::config::Environment::with_prefix("ADAGIO")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Load, validate and fall back to defaults on any problem. The warning
    /// names what was wrong; the program still starts.
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(settings) => match settings.validate() {
                Ok(()) => settings,
                Err(e) => {
                    warn!(error = %e, "invalid configuration, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                warn!(error = %e, "could not load configuration, using defaults");
                Self::default()
            }
        }
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        if self.audio.tick_rate == 0 {
            return Err("audio.tick_rate must be >= 1".to_string());
        }
        if self.audio.fade_secs < 0.0 {
            return Err("audio.fade_secs must not be negative".to_string());
        }
        if !(0.0..=1.0).contains(&self.audio.volume) {
            return Err("audio.volume must be between 0.0 and 1.0".to_string());
        }
        Ok(())
    }
}

/// Resolve the config path from `ADAGIO_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("ADAGIO_CONFIG_PATH") {
        let p = PathBuf::from(p);
        return Some(p);
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/adagio/config.toml`
/// or `~/.config/adagio/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else if let Some(home) = env::var_os("HOME") {
        Some(PathBuf::from(home).join(".config"))
    } else {
        None
    };

    config_home.map(|d| d.join("adagio").join("config.toml"))
}
