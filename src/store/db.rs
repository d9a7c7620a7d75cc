use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;
use tracing::debug;

use super::model::{SearchFilter, Track, TrackInfo};

/// Persistence-layer failure, localized to the failing call.
///
/// An `Err` from `upsert` or `query` never invalidates the store itself;
/// callers skip the failing item and continue.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("malformed track path: {0:?}")]
    MalformedPath(PathBuf),
    #[error("no such playlist: {0}")]
    NoSuchPlaylist(String),
    #[error("store is closed")]
    Closed,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// SQLite-backed catalog of tracks and playlists.
///
/// Access is serialized through an internal mutex: one connection, one
/// statement at a time. Concurrent scan-writes and UI-reads are safe because
/// each call is atomic and flushed before it returns.
pub struct MusicStore {
    conn: Mutex<Option<Connection>>,
}

impl MusicStore {
    /// Open (or create) the catalog at `path`, creating parent directories
    /// and the schema as needed.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;
        debug!(path = %path.display(), "opened music store");
        Ok(Self {
            conn: Mutex::new(Some(conn)),
        })
    }

    /// In-memory store, used by tests and throwaway sessions.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(Some(conn)),
        })
    }

    /// Default on-disk location under the platform data directory.
    pub fn default_db_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("adagio")
            .join("music_library.db")
    }

    fn init_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
            CREATE TABLE IF NOT EXISTS tracks (
                id INTEGER PRIMARY KEY,
                path TEXT NOT NULL UNIQUE,
                title TEXT NOT NULL DEFAULT '',
                artist TEXT NOT NULL DEFAULT '',
                album TEXT NOT NULL DEFAULT '',
                genre TEXT NOT NULL DEFAULT '',
                track_no INTEGER NOT NULL DEFAULT 0,
                year INTEGER NOT NULL DEFAULT 0,
                duration_secs REAL NOT NULL DEFAULT 0,
                bitrate INTEGER NOT NULL DEFAULT 0,
                sample_rate INTEGER NOT NULL DEFAULT 0,
                channels INTEGER NOT NULL DEFAULT 0,
                file_size INTEGER NOT NULL DEFAULT 0,
                modified_at INTEGER NOT NULL DEFAULT 0,
                play_count INTEGER NOT NULL DEFAULT 0,
                rating INTEGER NOT NULL DEFAULT 0,
                added_at TEXT NOT NULL DEFAULT ''
            );
            CREATE INDEX IF NOT EXISTS idx_tracks_artist ON tracks(artist);
            CREATE INDEX IF NOT EXISTS idx_tracks_album ON tracks(album);
            CREATE TABLE IF NOT EXISTS playlists (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL UNIQUE
            );
            CREATE TABLE IF NOT EXISTS playlist_items (
                playlist_id INTEGER NOT NULL REFERENCES playlists(id) ON DELETE CASCADE,
                track_id INTEGER NOT NULL REFERENCES tracks(id),
                position INTEGER NOT NULL,
                added_at TEXT NOT NULL DEFAULT '',
                PRIMARY KEY (playlist_id, track_id)
            );",
        )?;
        Ok(())
    }

    fn guard(&self) -> MutexGuard<'_, Option<Connection>> {
        // A poisoned lock only means another caller panicked mid-statement;
        // the connection itself is still usable.
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert-or-update keyed by file path, returning the row id.
    ///
    /// A fresh insert starts with `play_count = 0`, `rating = 0` and stamps
    /// `added_at`. Re-upserting an existing path overwrites the tag and
    /// technical fields but preserves id, play count, rating and added_at.
    pub fn upsert(&self, info: &TrackInfo) -> Result<i64, StoreError> {
        if info.path.as_os_str().is_empty() || info.path.file_name().is_none() {
            return Err(StoreError::MalformedPath(info.path.clone()));
        }
        let path = info.path.to_string_lossy();

        let guard = self.guard();
        let conn = guard.as_ref().ok_or(StoreError::Closed)?;

        let existing: Option<i64> = conn
            .query_row("SELECT id FROM tracks WHERE path = ?1", [&path], |row| {
                row.get(0)
            })
            .optional()?;

        match existing {
            Some(id) => {
                conn.execute(
                    "UPDATE tracks SET title = ?1, artist = ?2, album = ?3, genre = ?4,
                        track_no = ?5, year = ?6, duration_secs = ?7, bitrate = ?8,
                        sample_rate = ?9, channels = ?10, file_size = ?11, modified_at = ?12
                     WHERE id = ?13",
                    params![
                        info.title,
                        info.artist,
                        info.album,
                        info.genre,
                        info.track_no,
                        info.year,
                        info.duration_secs,
                        info.bitrate,
                        info.sample_rate,
                        info.channels,
                        info.file_size,
                        info.modified_at,
                        id
                    ],
                )?;
                Ok(id)
            }
            None => {
                conn.execute(
                    "INSERT INTO tracks (path, title, artist, album, genre, track_no, year,
                        duration_secs, bitrate, sample_rate, channels, file_size, modified_at,
                        play_count, rating, added_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, 0, 0, ?14)",
                    params![
                        path,
                        info.title,
                        info.artist,
                        info.album,
                        info.genre,
                        info.track_no,
                        info.year,
                        info.duration_secs,
                        info.bitrate,
                        info.sample_rate,
                        info.channels,
                        info.file_size,
                        info.modified_at,
                        Utc::now().to_rfc3339(),
                    ],
                )?;
                Ok(conn.last_insert_rowid())
            }
        }
    }

    /// Query the catalog, optionally narrowing by `filter` with a
    /// case-insensitive substring `term`.
    ///
    /// Results come back in a stable total order: artist, album, track
    /// number, then title, so repeated renders are reproducible.
    pub fn query(
        &self,
        filter: SearchFilter,
        term: Option<&str>,
    ) -> Result<Vec<Track>, StoreError> {
        let guard = self.guard();
        let conn = guard.as_ref().ok_or(StoreError::Closed)?;

        const COLUMNS: &str = "id, path, title, artist, album, genre, track_no, year, \
             duration_secs, bitrate, sample_rate, channels, file_size, modified_at, \
             play_count, rating, added_at";
        const ORDER: &str = "ORDER BY artist, album, track_no, title";

        let term = term.map(str::trim).filter(|t| !t.is_empty());
        let (sql, bound) = match term {
            None => (format!("SELECT {COLUMNS} FROM tracks {ORDER}"), None),
            Some(t) => {
                let predicate = match filter {
                    SearchFilter::All => {
                        "instr(lower(title), lower(?1)) > 0
                         OR instr(lower(artist), lower(?1)) > 0
                         OR instr(lower(album), lower(?1)) > 0"
                    }
                    SearchFilter::Artist => "instr(lower(artist), lower(?1)) > 0",
                    SearchFilter::Album => "instr(lower(album), lower(?1)) > 0",
                    SearchFilter::Genre => "instr(lower(genre), lower(?1)) > 0",
                    SearchFilter::Title => "instr(lower(title), lower(?1)) > 0",
                };
                (
                    format!("SELECT {COLUMNS} FROM tracks WHERE {predicate} {ORDER}"),
                    Some(t),
                )
            }
        };

        let mut stmt = conn.prepare(&sql)?;
        let rows = match bound {
            Some(t) => stmt.query_map([t], row_to_track)?,
            None => stmt.query_map([], row_to_track)?,
        };

        let mut tracks = Vec::new();
        for row in rows {
            tracks.push(row?);
        }
        Ok(tracks)
    }

    pub fn track_by_id(&self, id: i64) -> Result<Option<Track>, StoreError> {
        let guard = self.guard();
        let conn = guard.as_ref().ok_or(StoreError::Closed)?;
        let track = conn
            .query_row(
                "SELECT id, path, title, artist, album, genre, track_no, year,
                    duration_secs, bitrate, sample_rate, channels, file_size, modified_at,
                    play_count, rating, added_at
                 FROM tracks WHERE id = ?1",
                [id],
                row_to_track,
            )
            .optional()?;
        Ok(track)
    }

    pub fn track_by_path(&self, path: &Path) -> Result<Option<Track>, StoreError> {
        let guard = self.guard();
        let conn = guard.as_ref().ok_or(StoreError::Closed)?;
        let track = conn
            .query_row(
                "SELECT id, path, title, artist, album, genre, track_no, year,
                    duration_secs, bitrate, sample_rate, channels, file_size, modified_at,
                    play_count, rating, added_at
                 FROM tracks WHERE path = ?1",
                [path.to_string_lossy()],
                row_to_track,
            )
            .optional()?;
        Ok(track)
    }

    /// Atomic increment; unknown ids are a no-op, not an error.
    pub fn increment_play_count(&self, id: i64) -> Result<(), StoreError> {
        let guard = self.guard();
        let conn = guard.as_ref().ok_or(StoreError::Closed)?;
        conn.execute(
            "UPDATE tracks SET play_count = play_count + 1 WHERE id = ?1",
            [id],
        )?;
        Ok(())
    }

    /// Persist a user rating. Unknown ids are a no-op.
    pub fn set_rating(&self, id: i64, rating: u32) -> Result<(), StoreError> {
        let guard = self.guard();
        let conn = guard.as_ref().ok_or(StoreError::Closed)?;
        conn.execute(
            "UPDATE tracks SET rating = ?1 WHERE id = ?2",
            params![rating, id],
        )?;
        Ok(())
    }

    /// Delete every track and playlist row. Stale entries otherwise persist
    /// until this explicit prune.
    pub fn remove_all(&self) -> Result<(), StoreError> {
        let guard = self.guard();
        let conn = guard.as_ref().ok_or(StoreError::Closed)?;
        conn.execute_batch(
            "DELETE FROM playlist_items; DELETE FROM playlists; DELETE FROM tracks;",
        )?;
        Ok(())
    }

    pub fn create_playlist(&self, name: &str) -> Result<i64, StoreError> {
        let guard = self.guard();
        let conn = guard.as_ref().ok_or(StoreError::Closed)?;
        conn.execute(
            "INSERT OR IGNORE INTO playlists (name) VALUES (?1)",
            [name],
        )?;
        let id =
            conn.query_row("SELECT id FROM playlists WHERE name = ?1", [name], |row| {
                row.get(0)
            })?;
        Ok(id)
    }

    pub fn delete_playlist(&self, name: &str) -> Result<(), StoreError> {
        let guard = self.guard();
        let conn = guard.as_ref().ok_or(StoreError::Closed)?;
        conn.execute("DELETE FROM playlists WHERE name = ?1", [name])?;
        Ok(())
    }

    /// Append a track to a playlist. Position values stay dense: a new entry
    /// always takes `len` as its position.
    pub fn playlist_add(&self, name: &str, track_id: i64) -> Result<(), StoreError> {
        let guard = self.guard();
        let conn = guard.as_ref().ok_or(StoreError::Closed)?;
        let playlist_id = Self::playlist_id(conn, name)?;
        let next_pos: i64 = conn.query_row(
            "SELECT COUNT(*) FROM playlist_items WHERE playlist_id = ?1",
            [playlist_id],
            |row| row.get(0),
        )?;
        conn.execute(
            "INSERT OR IGNORE INTO playlist_items (playlist_id, track_id, position, added_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![playlist_id, track_id, next_pos, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Remove a track from a playlist, re-densifying the remaining positions.
    pub fn playlist_remove(&self, name: &str, track_id: i64) -> Result<(), StoreError> {
        let guard = self.guard();
        let conn = guard.as_ref().ok_or(StoreError::Closed)?;
        let playlist_id = Self::playlist_id(conn, name)?;
        conn.execute(
            "DELETE FROM playlist_items WHERE playlist_id = ?1 AND track_id = ?2",
            params![playlist_id, track_id],
        )?;

        // Reassign positions 0..n in the surviving order.
        let mut stmt = conn.prepare(
            "SELECT track_id FROM playlist_items WHERE playlist_id = ?1 ORDER BY position",
        )?;
        let survivors: Vec<i64> = stmt
            .query_map([playlist_id], |row| row.get(0))?
            .collect::<Result<_, _>>()?;
        drop(stmt);

        let mut update = conn.prepare(
            "UPDATE playlist_items SET position = ?1 WHERE playlist_id = ?2 AND track_id = ?3",
        )?;
        for (pos, tid) in survivors.iter().enumerate() {
            update.execute(params![pos as i64, playlist_id, tid])?;
        }
        Ok(())
    }

    /// Tracks of a playlist in position order.
    pub fn playlist_tracks(&self, name: &str) -> Result<Vec<Track>, StoreError> {
        let guard = self.guard();
        let conn = guard.as_ref().ok_or(StoreError::Closed)?;
        let playlist_id = Self::playlist_id(conn, name)?;
        let mut stmt = conn.prepare(
            "SELECT t.id, t.path, t.title, t.artist, t.album, t.genre, t.track_no, t.year,
                t.duration_secs, t.bitrate, t.sample_rate, t.channels, t.file_size,
                t.modified_at, t.play_count, t.rating, t.added_at
             FROM playlist_items p JOIN tracks t ON t.id = p.track_id
             WHERE p.playlist_id = ?1
             ORDER BY p.position",
        )?;
        let rows = stmt.query_map([playlist_id], row_to_track)?;
        let mut tracks = Vec::new();
        for row in rows {
            tracks.push(row?);
        }
        Ok(tracks)
    }

    /// Positions of a playlist's entries, keyed by track id, in order.
    pub fn playlist_positions(&self, name: &str) -> Result<Vec<(i64, i64)>, StoreError> {
        let guard = self.guard();
        let conn = guard.as_ref().ok_or(StoreError::Closed)?;
        let playlist_id = Self::playlist_id(conn, name)?;
        let mut stmt = conn.prepare(
            "SELECT track_id, position FROM playlist_items
             WHERE playlist_id = ?1 ORDER BY position",
        )?;
        let rows = stmt.query_map([playlist_id], |row| Ok((row.get(0)?, row.get(1)?)))?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn playlist_id(conn: &Connection, name: &str) -> Result<i64, StoreError> {
        conn.query_row("SELECT id FROM playlists WHERE name = ?1", [name], |row| {
            row.get(0)
        })
        .optional()?
        .ok_or_else(|| StoreError::NoSuchPlaylist(name.to_string()))
    }

    /// Release the underlying connection. Safe to call more than once; later
    /// catalog calls return [`StoreError::Closed`].
    pub fn close(&self) {
        let mut guard = self.guard();
        if let Some(conn) = guard.take() {
            // close() hands the connection back on failure; dropping it is
            // the best we can do at shutdown.
            let _ = conn.close();
        }
    }
}

fn row_to_track(row: &rusqlite::Row<'_>) -> rusqlite::Result<Track> {
    Ok(Track {
        id: row.get(0)?,
        path: PathBuf::from(row.get::<_, String>(1)?),
        title: row.get(2)?,
        artist: row.get(3)?,
        album: row.get(4)?,
        genre: row.get(5)?,
        track_no: row.get(6)?,
        year: row.get(7)?,
        duration_secs: row.get(8)?,
        bitrate: row.get(9)?,
        sample_rate: row.get(10)?,
        channels: row.get(11)?,
        file_size: row.get(12)?,
        modified_at: row.get(13)?,
        play_count: row.get(14)?,
        rating: row.get(15)?,
        added_at: row.get(16)?,
    })
}
