use std::path::Path;
use std::time::Duration;

use tracing::debug;

use super::backend::{AudioBackend, AudioSink, MediaError};
use super::fade::FadeRamp;

/// Engine lifecycle state.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PlayerState {
    Empty,
    Loaded,
    Playing,
    Paused,
}

/// What happens when an active fade ramp reaches its target.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum FadeOutcome {
    /// Fade-in: nothing left to do at the target volume.
    Settle,
    Pause,
    Stop,
}

struct ActiveFade {
    ramp: FadeRamp,
    outcome: FadeOutcome,
}

/// Owns the single live audio handle and its fade state.
///
/// Loading a new file always releases the previous handle first; there are
/// never two concurrent handles. Query calls (`position`, `duration`) return
/// defaults instead of failing when nothing is loaded.
pub struct PlaybackEngine {
    backend: Box<dyn AudioBackend>,
    sink: Option<Box<dyn AudioSink>>,
    state: PlayerState,
    /// Target volume in [0, 1]; fades ramp toward (or away from) this.
    volume: f32,
    fade_secs: f32,
    tick_rate: u32,
    fade: Option<ActiveFade>,
}

impl PlaybackEngine {
    pub fn new(backend: Box<dyn AudioBackend>, fade_secs: f32, tick_rate: u32) -> Self {
        Self {
            backend,
            sink: None,
            state: PlayerState::Empty,
            volume: 1.0,
            fade_secs,
            tick_rate: tick_rate.max(1),
            fade: None,
        }
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn is_fading(&self) -> bool {
        self.fade.is_some()
    }

    /// Release any current handle and open `path`.
    ///
    /// On failure the engine has already released the old handle and remains
    /// `Empty`; a failed load never leaves a half-loaded state behind.
    pub fn load(&mut self, path: &Path) -> Result<(), MediaError> {
        self.release();
        let mut sink = self.backend.open(path)?;
        sink.set_volume(self.volume);
        self.sink = Some(sink);
        self.state = PlayerState::Loaded;
        Ok(())
    }

    /// `loaded/paused → playing`. With `fade_in`, volume ramps from zero to
    /// the target over the configured duration; otherwise it jumps.
    ///
    /// Starting playback cancels any in-flight ramp (last writer wins).
    pub fn play(&mut self, fade_in: bool) {
        self.fade = None;
        let Some(sink) = self.sink.as_mut() else {
            return;
        };
        if fade_in && self.fade_secs > 0.0 {
            sink.set_volume(0.0);
            self.fade = Some(ActiveFade {
                ramp: FadeRamp::new(0.0, self.volume, self.fade_secs, self.tick_rate),
                outcome: FadeOutcome::Settle,
            });
        } else {
            sink.set_volume(self.volume);
        }
        sink.play();
        self.state = PlayerState::Playing;
    }

    /// `playing → paused`, with an optional symmetric ramp-down. The state
    /// flips to `Paused` once the ramp completes (immediately without fade).
    pub fn pause(&mut self, fade_out: bool) {
        self.fade = None;
        if self.state != PlayerState::Playing {
            return;
        }
        let Some(sink) = self.sink.as_mut() else {
            return;
        };
        if fade_out && self.fade_secs > 0.0 {
            self.fade = Some(ActiveFade {
                ramp: FadeRamp::new(self.volume, 0.0, self.fade_secs, self.tick_rate),
                outcome: FadeOutcome::Pause,
            });
        } else {
            sink.pause();
            self.state = PlayerState::Paused;
        }
    }

    /// Ramp down to silence, then release the handle. Falls back to an
    /// immediate stop when nothing is audible.
    pub fn fade_out_and_stop(&mut self) {
        self.fade = None;
        if self.state == PlayerState::Playing && self.fade_secs > 0.0 {
            self.fade = Some(ActiveFade {
                ramp: FadeRamp::new(self.volume, 0.0, self.fade_secs, self.tick_rate),
                outcome: FadeOutcome::Stop,
            });
        } else {
            self.stop();
        }
    }

    /// Any state → `Empty`. Releases the handle unconditionally; idempotent.
    pub fn stop(&mut self) {
        self.release();
    }

    fn release(&mut self) {
        self.fade = None;
        if let Some(mut sink) = self.sink.take() {
            sink.stop();
        }
        self.state = PlayerState::Empty;
    }

    /// Advance the active fade ramp one step; applies the terminal action
    /// when the ramp completes. Call at `tick_rate` per second.
    pub fn tick(&mut self) {
        let Some(active) = self.fade.as_mut() else {
            return;
        };
        let level = active.ramp.advance();
        if let Some(sink) = self.sink.as_mut() {
            sink.set_volume(level);
        }
        if active.ramp.complete() {
            let outcome = active.outcome;
            self.fade = None;
            match outcome {
                FadeOutcome::Settle => {}
                FadeOutcome::Pause => {
                    if let Some(sink) = self.sink.as_mut() {
                        sink.pause();
                        // Restore the target volume so the next play starts
                        // audible.
                        sink.set_volume(self.volume);
                    }
                    self.state = PlayerState::Paused;
                    debug!("fade-out complete, paused");
                }
                FadeOutcome::Stop => {
                    self.stop();
                    debug!("fade-out complete, stopped");
                }
            }
        }
    }

    /// Seek to an absolute position; a no-op when nothing is loaded.
    pub fn seek(&mut self, position: Duration) {
        if let Some(sink) = self.sink.as_mut() {
            sink.try_seek(position);
        }
    }

    /// Set the target volume, clamped to [0, 1]. Applied immediately unless
    /// a ramp is in flight (the ramp already aims at the old target and will
    /// be cancelled by the next play/pause/stop).
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        if self.fade.is_none() {
            if let Some(sink) = self.sink.as_mut() {
                sink.set_volume(self.volume);
            }
        }
    }

    pub fn position(&self) -> Duration {
        self.sink
            .as_ref()
            .map(|s| s.position())
            .unwrap_or(Duration::ZERO)
    }

    pub fn duration(&self) -> Duration {
        self.sink
            .as_ref()
            .and_then(|s| s.duration())
            .unwrap_or(Duration::ZERO)
    }
}
