use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};

use tracing::{info, warn};

use crate::store::MusicStore;

use super::tags::extract_info;
use super::walk::collect_files;

/// How many failure messages a summary keeps verbatim.
const FAILURE_SAMPLE_CAP: usize = 5;

/// Progress and completion events emitted by a scan worker.
///
/// Workers never touch playback state; they write to the store and report
/// through this channel, which the owning context drains on its tick.
#[derive(Debug)]
pub enum ScanEvent {
    Progress { processed: usize, total: usize },
    Done(ScanSummary),
}

/// Aggregate result of one scan batch.
#[derive(Debug, Default, Clone)]
pub struct ScanSummary {
    /// Files successfully upserted into the store.
    pub added: usize,
    /// Per-file failures; never aborts the batch.
    pub failures: usize,
    /// First few failure messages, for a terse notification.
    pub sample_errors: Vec<String>,
}

impl ScanSummary {
    pub(super) fn record_failure(&mut self, message: String) {
        self.failures += 1;
        if self.sample_errors.len() < FAILURE_SAMPLE_CAP {
            self.sample_errors.push(message);
        }
    }
}

/// Run a scan batch on a background thread.
///
/// Discovers files under `roots`, extracts metadata and upserts each file
/// into `store`, reporting incremental progress over `tx`. Per-file store
/// failures are collected into the final [`ScanSummary`] rather than
/// propagated. Dropping the receiver simply ends reporting; the batch still
/// completes.
pub fn spawn_scan(
    roots: Vec<PathBuf>,
    store: Arc<MusicStore>,
    tx: Sender<ScanEvent>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let files = collect_files(&roots);
        let total = files.len();
        info!(total, roots = roots.len(), "scan started");

        let mut summary = ScanSummary::default();
        for (processed, path) in files.iter().enumerate() {
            let info = extract_info(path);
            match store.upsert(&info) {
                Ok(_) => summary.added += 1,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "upsert failed, skipping file");
                    summary.record_failure(format!("{}: {e}", path.display()));
                }
            }

            let processed = processed + 1;
            if processed % 10 == 0 || processed == total {
                let _ = tx.send(ScanEvent::Progress { processed, total });
            }
        }

        info!(
            added = summary.added,
            failures = summary.failures,
            "scan finished"
        );
        let _ = tx.send(ScanEvent::Done(summary));
    })
}
