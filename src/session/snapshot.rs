//! Persisted session state: current track, position, volume and the pending
//! queue. Saved on clean shutdown, restored on startup, and always optional:
//! a missing or corrupt snapshot file means a fresh session, never a failure.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub current_song_id: Option<i64>,
    pub position_secs: f64,
    pub volume: f32,
    /// Pending queue track ids, front first.
    pub queue: Vec<i64>,
}

/// Write the snapshot as JSON. Failures are logged and swallowed; snapshot
/// persistence must never take the shutdown path down with it.
pub fn save_snapshot(path: &Path, snapshot: &SessionSnapshot) {
    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!(path = %path.display(), error = %e, "could not create snapshot directory");
            return;
        }
    }
    let file = match File::create(path) {
        Ok(f) => f,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not write session snapshot");
            return;
        }
    };
    if let Err(e) = serde_json::to_writer_pretty(BufWriter::new(file), snapshot) {
        warn!(path = %path.display(), error = %e, "could not serialize session snapshot");
    }
}

/// Read a snapshot back. Missing file, unreadable file and malformed JSON
/// all yield `None`.
pub fn load_snapshot(path: &Path) -> Option<SessionSnapshot> {
    let data = match fs::read_to_string(path) {
        Ok(d) => d,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "no session snapshot to restore");
            return None;
        }
    };
    match serde_json::from_str(&data) {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring corrupt session snapshot");
            None
        }
    }
}
