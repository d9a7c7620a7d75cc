//! Directory scanning and best-effort tag extraction.
//!
//! The scanner walks candidate roots (depth-limited), filters by the fixed
//! audio extension table and produces a [`TrackInfo`] for every discovered
//! file. Extraction never hard-fails: unreadable tags fall back to filename
//! heuristics so a single broken file cannot abort a scan batch.

mod tags;
mod walk;
mod worker;

pub use tags::{LoftyReader, TagReader, extract_info};
pub use walk::{SUPPORTED_EXTENSIONS, collect_files, default_scan_roots, is_supported};
pub use worker::{ScanEvent, ScanSummary, spawn_scan};
