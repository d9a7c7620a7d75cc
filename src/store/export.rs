//! On-demand JSON export of the whole catalog.

use std::io::Write;

use chrono::Utc;
use serde::Serialize;

use super::db::{MusicStore, StoreError};
use super::model::{SearchFilter, Track};

#[derive(Debug, Serialize)]
struct CatalogExport<'a> {
    export_date: String,
    total_songs: usize,
    songs: &'a [Track],
}

impl MusicStore {
    /// Write the full catalog as a JSON document:
    /// `{export_date, total_songs, songs: [...]}`.
    pub fn export_json<W: Write>(&self, writer: W) -> Result<usize, StoreError> {
        let songs = self.query(SearchFilter::All, None)?;
        let doc = CatalogExport {
            export_date: Utc::now().to_rfc3339(),
            total_songs: songs.len(),
            songs: &songs,
        };
        serde_json::to_writer_pretty(writer, &doc)
            .map_err(|e| StoreError::Io(std::io::Error::other(e)))?;
        Ok(songs.len())
    }
}
