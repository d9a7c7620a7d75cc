use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};
use thiserror::Error;
use tracing::debug;

/// The engine cannot open or decode a file.
///
/// Surfaced to the caller as a failed `load`; the engine stays `Empty`.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("file not found: {0:?}")]
    NotFound(PathBuf),
    #[error("failed to open {path:?}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to decode {path:?}: {reason}")]
    Decode { path: PathBuf, reason: String },
    #[error("no audio output device: {0}")]
    Output(String),
}

/// One live, decoded audio handle.
pub trait AudioSink {
    fn play(&mut self);
    fn pause(&mut self);
    fn stop(&mut self);
    fn set_volume(&mut self, volume: f32);
    /// Seek to an absolute position; `false` when the source cannot seek.
    fn try_seek(&mut self, position: Duration) -> bool;
    fn position(&self) -> Duration;
    fn duration(&self) -> Option<Duration>;
}

/// Opens files into playable sinks.
pub trait AudioBackend {
    fn open(&mut self, path: &Path) -> Result<Box<dyn AudioSink>, MediaError>;
}

/// Production backend over a rodio output stream.
pub struct RodioBackend {
    stream: OutputStream,
}

impl RodioBackend {
    pub fn new() -> Result<Self, MediaError> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| MediaError::Output(e.to_string()))?;
        // rodio logs to stderr when the stream drops; useful while debugging,
        // noise otherwise.
        stream.log_on_drop(false);
        Ok(Self { stream })
    }
}

impl AudioBackend for RodioBackend {
    fn open(&mut self, path: &Path) -> Result<Box<dyn AudioSink>, MediaError> {
        if !path.exists() {
            return Err(MediaError::NotFound(path.to_path_buf()));
        }
        let file = File::open(path).map_err(|source| MediaError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let source = Decoder::new(BufReader::new(file)).map_err(|e| MediaError::Decode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let duration = source.total_duration();

        let sink = Sink::connect_new(self.stream.mixer());
        sink.append(source);
        // The engine decides when playback actually starts.
        sink.pause();
        debug!(path = %path.display(), "opened audio sink");
        Ok(Box::new(RodioSink { sink, duration }))
    }
}

struct RodioSink {
    sink: Sink,
    duration: Option<Duration>,
}

impl AudioSink for RodioSink {
    fn play(&mut self) {
        self.sink.play();
    }

    fn pause(&mut self) {
        self.sink.pause();
    }

    fn stop(&mut self) {
        self.sink.stop();
    }

    fn set_volume(&mut self, volume: f32) {
        self.sink.set_volume(volume);
    }

    fn try_seek(&mut self, position: Duration) -> bool {
        self.sink.try_seek(position).is_ok()
    }

    fn position(&self) -> Duration {
        self.sink.get_pos()
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }
}
