//! The session's ordered upcoming/history lists, distinct from any persisted
//! playlist.
//!
//! Entries are lightweight references (id + path + display string) into the
//! store; the queue never duplicates catalog metadata. The current track is
//! held by the session alone and is never simultaneously present in either
//! list.

use std::collections::VecDeque;
use std::path::PathBuf;

use crate::store::Track;

/// A track reference held by the play queue.
#[derive(Debug, Clone, PartialEq)]
pub struct QueueEntry {
    pub track_id: i64,
    pub path: PathBuf,
    pub display: String,
    /// Set once the entry has moved into history.
    pub played: bool,
}

impl QueueEntry {
    pub fn from_track(track: &Track) -> Self {
        Self {
            track_id: track.id,
            path: track.path.clone(),
            display: track.display(),
            played: false,
        }
    }
}

/// Ordered pending/history lists with next/previous navigation.
#[derive(Debug, Default)]
pub struct PlayQueue {
    upcoming: VecDeque<QueueEntry>,
    history: Vec<QueueEntry>,
    current: Option<QueueEntry>,
}

impl PlayQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&QueueEntry> {
        self.current.as_ref()
    }

    /// The entry `advance()` would promote, without moving anything.
    pub fn peek_next(&self) -> Option<&QueueEntry> {
        self.upcoming.front()
    }

    /// The entry `rewind()` would restore, without moving anything.
    pub fn peek_previous(&self) -> Option<&QueueEntry> {
        self.history.last()
    }

    pub fn upcoming(&self) -> impl Iterator<Item = &QueueEntry> {
        self.upcoming.iter()
    }

    pub fn history(&self) -> impl Iterator<Item = &QueueEntry> {
        self.history.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_none() && self.upcoming.is_empty() && self.history.is_empty()
    }

    /// Append an entry. With `play_now` the entry is promoted straight to
    /// current; a displaced current track goes to the *front* of upcoming,
    /// not to history and not discarded.
    pub fn add(&mut self, entry: QueueEntry, play_now: bool) {
        if play_now {
            if let Some(displaced) = self.current.take() {
                self.upcoming.push_front(displaced);
            }
            self.current = Some(entry);
        } else {
            self.upcoming.push_back(entry);
        }
    }

    /// Move current into history and pop the front of upcoming as the new
    /// current. An empty upcoming list is the normal end-of-queue condition:
    /// current becomes `None` and `None` is returned.
    pub fn advance(&mut self) -> Option<&QueueEntry> {
        if let Some(mut finished) = self.current.take() {
            finished.played = true;
            self.history.push(finished);
        }
        self.current = self.upcoming.pop_front();
        self.current.as_ref()
    }

    /// Pop the back of history as the new current, pushing the previous
    /// current to the front of upcoming. Returns `None` when history is
    /// empty, leaving everything untouched.
    pub fn rewind(&mut self) -> Option<&QueueEntry> {
        let mut previous = self.history.pop()?;
        previous.played = false;
        if let Some(displaced) = self.current.take() {
            self.upcoming.push_front(displaced);
        }
        self.current = Some(previous);
        self.current.as_ref()
    }

    pub fn clear(&mut self) {
        self.upcoming.clear();
        self.history.clear();
        self.current = None;
    }

    /// Track ids of the pending entries, for session persistence.
    pub fn pending_ids(&self) -> Vec<i64> {
        self.upcoming.iter().map(|e| e.track_id).collect()
    }
}
