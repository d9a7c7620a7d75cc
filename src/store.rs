//! Persistent track/playlist catalog backed by SQLite.
//!
//! `MusicStore` owns the only database connection; every component that needs
//! catalog access receives an explicit handle at construction time. All
//! mutations are flushed before the call returns, so callers may treat the
//! store as synchronously consistent.

mod db;
mod export;
mod model;

pub use db::{MusicStore, StoreError};
pub use model::{SearchFilter, Track, TrackInfo};
