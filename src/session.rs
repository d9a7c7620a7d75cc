//! Foreground playback session: the single writer of engine and queue state.
//!
//! The session owns the playback engine, play queue, sleep timer and
//! equalizer, plus an explicit store handle. Background scan workers only
//! write to the store and report over a channel; the session drains that
//! channel, advances fades and polls the sleep countdown on each `tick()`.

mod snapshot;

pub use snapshot::{SessionSnapshot, load_snapshot, save_snapshot};

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{info, warn};

use crate::equalizer::Equalizer;
use crate::player::{MediaError, PlaybackEngine, PlayerState};
use crate::queue::{PlayQueue, QueueEntry};
use crate::scanner::{ScanEvent, ScanSummary, spawn_scan};
use crate::store::{MusicStore, StoreError};
use crate::timer::{SleepAction, SleepTimer};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Media(#[from] MediaError),
    #[error("no such track: {0}")]
    UnknownTrack(i64),
}

pub struct Session {
    store: Arc<MusicStore>,
    engine: PlaybackEngine,
    queue: PlayQueue,
    timer: SleepTimer,
    equalizer: Equalizer,
    scan_rx: Option<Receiver<ScanEvent>>,
    scan_progress: Option<(usize, usize)>,
    last_scan: Option<ScanSummary>,
}

impl Session {
    pub fn new(store: Arc<MusicStore>, engine: PlaybackEngine) -> Self {
        Self {
            store,
            engine,
            queue: PlayQueue::new(),
            timer: SleepTimer::new(),
            equalizer: Equalizer::new(),
            scan_rx: None,
            scan_progress: None,
            last_scan: None,
        }
    }

    pub fn store(&self) -> &Arc<MusicStore> {
        &self.store
    }

    pub fn queue(&self) -> &PlayQueue {
        &self.queue
    }

    pub fn player_state(&self) -> PlayerState {
        self.engine.state()
    }

    /// Promote a catalog track to current and start playing it.
    ///
    /// The engine is loaded before the queue is touched, so a failed load
    /// leaves both engine (`Empty`) and queue exactly as they were.
    pub fn play_track(&mut self, id: i64) -> Result<(), SessionError> {
        let track = self
            .store
            .track_by_id(id)?
            .ok_or(SessionError::UnknownTrack(id))?;

        self.engine.load(&track.path)?;
        self.queue.add(QueueEntry::from_track(&track), true);
        self.engine.play(false);
        self.store.increment_play_count(id)?;
        info!(id, title = %track.title, "playing");
        Ok(())
    }

    /// Append a catalog track to the end of upcoming.
    pub fn enqueue(&mut self, id: i64) -> Result<(), SessionError> {
        let track = self
            .store
            .track_by_id(id)?
            .ok_or(SessionError::UnknownTrack(id))?;
        self.queue.add(QueueEntry::from_track(&track), false);
        Ok(())
    }

    /// Advance to the next queued track. `Ok(None)` is the normal
    /// end-of-queue condition: the engine is stopped, not failed.
    ///
    /// As with [`Session::play_track`], the engine loads before the queue
    /// moves, so a failed load leaves the queue exactly as it was.
    pub fn next(&mut self) -> Result<Option<i64>, SessionError> {
        match self.queue.peek_next().cloned() {
            Some(entry) => {
                self.engine.load(&entry.path)?;
                self.queue.advance();
                self.engine.play(false);
                self.store.increment_play_count(entry.track_id)?;
                Ok(Some(entry.track_id))
            }
            None => {
                self.queue.advance();
                self.engine.stop();
                Ok(None)
            }
        }
    }

    /// Step back to the most recent history entry; `Ok(None)` (nothing
    /// played yet) leaves playback untouched. A replay from history counts
    /// as a play like any other.
    pub fn previous(&mut self) -> Result<Option<i64>, SessionError> {
        match self.queue.peek_previous().cloned() {
            Some(entry) => {
                self.engine.load(&entry.path)?;
                self.queue.rewind();
                self.engine.play(false);
                self.store.increment_play_count(entry.track_id)?;
                Ok(Some(entry.track_id))
            }
            None => Ok(None),
        }
    }

    pub fn toggle_pause(&mut self) {
        match self.engine.state() {
            PlayerState::Playing => self.engine.pause(false),
            PlayerState::Paused | PlayerState::Loaded => self.engine.play(false),
            PlayerState::Empty => {}
        }
    }

    pub fn pause(&mut self, fade_out: bool) {
        self.engine.pause(fade_out);
    }

    pub fn stop(&mut self) {
        self.engine.stop();
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.engine.set_volume(volume);
    }

    pub fn seek(&mut self, position: Duration) {
        self.engine.seek(position);
    }

    pub fn position(&self) -> Duration {
        self.engine.position()
    }

    pub fn duration(&self) -> Duration {
        self.engine.duration()
    }

    pub fn start_sleep_timer(&mut self, minutes: u64, action: SleepAction) {
        self.timer.start(Instant::now(), minutes, action);
    }

    pub fn cancel_sleep_timer(&mut self) {
        self.timer.cancel();
    }

    pub fn sleep_remaining(&self, now: Instant) -> u64 {
        self.timer.remaining(now)
    }

    pub fn equalizer(&self) -> &Equalizer {
        &self.equalizer
    }

    pub fn equalizer_mut(&mut self) -> &mut Equalizer {
        &mut self.equalizer
    }

    /// Kick off a background scan of `roots`. Progress and the final summary
    /// surface through [`Session::tick`]. Starting a new scan replaces the
    /// previous channel.
    pub fn start_scan(&mut self, roots: Vec<std::path::PathBuf>) {
        let (tx, rx) = mpsc::channel();
        spawn_scan(roots, self.store.clone(), tx);
        self.scan_rx = Some(rx);
        self.scan_progress = None;
    }

    /// (processed, total) of the scan in flight, if any.
    pub fn scan_progress(&self) -> Option<(usize, usize)> {
        self.scan_progress
    }

    pub fn last_scan_summary(&self) -> Option<&ScanSummary> {
        self.last_scan.as_ref()
    }

    /// One scheduling tick of the foreground context: drain worker events,
    /// advance any fade ramp, and fire the sleep timer at most once.
    pub fn tick(&mut self, now: Instant) {
        self.drain_scan_events();
        self.engine.tick();
        if let Some(action) = self.timer.poll(now) {
            match action {
                SleepAction::Stop => self.engine.stop(),
                SleepAction::Pause => self.engine.pause(false),
                SleepAction::FadeThenStop => self.engine.fade_out_and_stop(),
            }
        }
    }

    fn drain_scan_events(&mut self) {
        let Some(rx) = self.scan_rx.as_ref() else {
            return;
        };
        let mut finished = false;
        while let Ok(event) = rx.try_recv() {
            match event {
                ScanEvent::Progress { processed, total } => {
                    self.scan_progress = Some((processed, total));
                }
                ScanEvent::Done(summary) => {
                    info!(
                        added = summary.added,
                        failures = summary.failures,
                        "scan batch finished"
                    );
                    self.scan_progress = None;
                    self.last_scan = Some(summary);
                    finished = true;
                }
            }
        }
        if finished {
            self.scan_rx = None;
        }
    }

    /// Capture the restorable part of this session.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            current_song_id: self.queue.current().map(|e| e.track_id),
            position_secs: self.engine.position().as_secs_f64(),
            volume: self.engine.volume(),
            queue: self.queue.pending_ids(),
        }
    }

    /// Best-effort restore: unknown tracks are skipped, a failed load of the
    /// previous current track degrades to an empty engine. The restored
    /// current track is loaded and sought, but not auto-played.
    pub fn restore(&mut self, snap: &SessionSnapshot) {
        self.engine.set_volume(snap.volume);

        for id in &snap.queue {
            match self.store.track_by_id(*id) {
                Ok(Some(track)) => self.queue.add(QueueEntry::from_track(&track), false),
                Ok(None) => warn!(id, "snapshot references unknown track, skipping"),
                Err(e) => warn!(id, error = %e, "snapshot restore lookup failed"),
            }
        }

        if let Some(id) = snap.current_song_id {
            match self.store.track_by_id(id) {
                Ok(Some(track)) => {
                    self.queue.add(QueueEntry::from_track(&track), true);
                    if let Err(e) = self.engine.load(&track.path) {
                        warn!(id, error = %e, "could not reload previous track");
                    } else {
                        self.engine.seek(Duration::from_secs_f64(snap.position_secs));
                    }
                }
                Ok(None) => warn!(id, "previous current track no longer in catalog"),
                Err(e) => warn!(id, error = %e, "snapshot restore lookup failed"),
            }
        }
    }
}

#[cfg(test)]
mod tests;
