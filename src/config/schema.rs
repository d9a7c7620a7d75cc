use std::path::PathBuf;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/adagio/config.toml` or `~/.config/adagio/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `ADAGIO__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub library: LibrarySettings,
    pub audio: AudioSettings,
    pub storage: StorageSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            library: LibrarySettings::default(),
            audio: AudioSettings::default(),
            storage: StorageSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// Directories to scan for audio files. Empty means the host defaults
    /// (the user's Music and Downloads folders).
    pub scan_roots: Vec<PathBuf>,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            scan_roots: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Duration of fade-in/fade-out ramps, in seconds. 0 disables fading.
    pub fade_secs: f32,
    /// Foreground ticks per second driving fades and the sleep timer.
    pub tick_rate: u32,
    /// Initial playback volume, 0.0 to 1.0.
    pub volume: f32,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            fade_secs: 1.0,
            tick_rate: 10,
            volume: 0.8,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Catalog database path; defaults to the platform data directory.
    pub db_path: Option<PathBuf>,
    /// Session snapshot path; defaults to a sibling of the database.
    pub snapshot_path: Option<PathBuf>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            db_path: None,
            snapshot_path: None,
        }
    }
}
