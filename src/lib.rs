//! Core of a local music library manager: an SQLite-backed catalog, a
//! tag-reading directory scanner, and a playback session with queue
//! navigation, volume fades, a sleep timer and equalizer state.
//!
//! Background scan workers own nothing but a store handle and a channel; all
//! playback state lives in the single foreground [`session::Session`], which
//! the embedding frontend drives with a periodic tick.

pub mod config;
pub mod equalizer;
pub mod logging;
pub mod player;
pub mod queue;
pub mod scanner;
pub mod session;
pub mod store;
pub mod timer;
