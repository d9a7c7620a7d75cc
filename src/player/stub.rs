//! In-memory audio backend used by engine and session tests.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::backend::{AudioBackend, AudioSink, MediaError};

/// Observable state of the most recently opened stub sink.
#[derive(Debug, Default, Clone)]
pub struct SinkProbe {
    pub playing: bool,
    pub stopped: bool,
    pub volume: f32,
    pub sought_to: Option<Duration>,
}

pub type SharedProbe = Arc<Mutex<SinkProbe>>;

/// Backend that opens every path except ones ending in `missing.mp3`,
/// exposing each sink's state through a shared probe.
pub struct StubBackend {
    pub probe: SharedProbe,
    pub opened: Vec<std::path::PathBuf>,
}

impl StubBackend {
    pub fn new() -> (Self, SharedProbe) {
        let probe: SharedProbe = Arc::default();
        (
            Self {
                probe: probe.clone(),
                opened: Vec::new(),
            },
            probe.clone(),
        )
    }
}

impl AudioBackend for StubBackend {
    fn open(&mut self, path: &Path) -> Result<Box<dyn AudioSink>, MediaError> {
        if path.ends_with("missing.mp3") {
            return Err(MediaError::NotFound(path.to_path_buf()));
        }
        self.opened.push(path.to_path_buf());
        *self.probe.lock().unwrap() = SinkProbe {
            volume: 1.0,
            ..SinkProbe::default()
        };
        Ok(Box::new(StubSink {
            probe: self.probe.clone(),
        }))
    }
}

struct StubSink {
    probe: SharedProbe,
}

impl AudioSink for StubSink {
    fn play(&mut self) {
        self.probe.lock().unwrap().playing = true;
    }

    fn pause(&mut self) {
        self.probe.lock().unwrap().playing = false;
    }

    fn stop(&mut self) {
        let mut probe = self.probe.lock().unwrap();
        probe.playing = false;
        probe.stopped = true;
    }

    fn set_volume(&mut self, volume: f32) {
        self.probe.lock().unwrap().volume = volume;
    }

    fn try_seek(&mut self, position: Duration) -> bool {
        self.probe.lock().unwrap().sought_to = Some(position);
        true
    }

    fn position(&self) -> Duration {
        self.probe
            .lock()
            .unwrap()
            .sought_to
            .unwrap_or(Duration::ZERO)
    }

    fn duration(&self) -> Option<Duration> {
        Some(Duration::from_secs(180))
    }
}
