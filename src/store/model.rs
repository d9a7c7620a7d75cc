use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Metadata for a single audio file as produced by the scanner.
///
/// Carries no identity or play statistics; those belong to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackInfo {
    pub path: PathBuf,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub genre: String,
    pub track_no: u32,
    pub year: u32,
    /// Duration in seconds; 0.0 when the container gave us nothing.
    pub duration_secs: f64,
    /// Average bitrate in kbps; 0 when unavailable.
    pub bitrate: u32,
    pub sample_rate: u32,
    pub channels: u32,
    pub file_size: u64,
    /// Unix timestamp of the file's last modification; 0 when unavailable.
    pub modified_at: i64,
}

impl TrackInfo {
    /// Minimal info for a path, with every metadata field at its fallback value.
    pub fn empty(path: PathBuf) -> Self {
        Self {
            path,
            title: String::new(),
            artist: String::new(),
            album: String::new(),
            genre: String::new(),
            track_no: 0,
            year: 0,
            duration_secs: 0.0,
            bitrate: 0,
            sample_rate: 0,
            channels: 0,
            file_size: 0,
            modified_at: 0,
        }
    }
}

/// One indexed audio file with persisted metadata and play statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: i64,
    pub path: PathBuf,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub genre: String,
    pub track_no: u32,
    pub year: u32,
    pub duration_secs: f64,
    pub bitrate: u32,
    pub sample_rate: u32,
    pub channels: u32,
    pub file_size: u64,
    pub modified_at: i64,
    pub play_count: u32,
    pub rating: u32,
    /// RFC 3339 timestamp of first discovery.
    pub added_at: String,
}

impl Track {
    /// "Artist - Title" when an artist is known, otherwise just the title.
    pub fn display(&self) -> String {
        let artist = self.artist.trim();
        if artist.is_empty() {
            self.title.clone()
        } else {
            format!("{} - {}", artist, self.title)
        }
    }
}

/// Which column a catalog query matches its search term against.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SearchFilter {
    /// Match the term against title, artist and album.
    All,
    Artist,
    Album,
    Genre,
    Title,
}
