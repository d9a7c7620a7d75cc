//! Playback engine: owns at most one live audio handle at a time.
//!
//! The engine drives `empty → loaded → playing ⇄ paused` transitions, with
//! `stop` returning to `empty` from anywhere. Fade transitions are linear
//! ramps advanced by periodic `tick()` calls from the owning context, never
//! by blocking waits. The audio backend sits behind a trait so the engine's
//! state machine is testable without an output device.

mod backend;
mod engine;
mod fade;

pub use backend::{AudioBackend, AudioSink, MediaError, RodioBackend};
pub use engine::{PlaybackEngine, PlayerState};
pub use fade::FadeRamp;

#[cfg(test)]
pub(crate) mod stub;
