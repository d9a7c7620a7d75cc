use std::env;
use std::fs::File;
use std::io::BufWriter;
use std::sync::{Arc, mpsc};

use adagio::config::Settings;
use adagio::scanner::{self, ScanEvent};
use adagio::store::{MusicStore, SearchFilter};
use tracing::info;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    adagio::logging::init();

    let settings = Settings::load_or_default();
    let db_path = settings
        .storage
        .db_path
        .clone()
        .unwrap_or_else(MusicStore::default_db_path);
    let store = Arc::new(MusicStore::open(&db_path)?);
    info!(db = %db_path.display(), "catalog opened");

    match env::args().nth(1).as_deref() {
        Some("scan") | None => scan(&settings, &store),
        Some("list") => list(&store, env::args().nth(2))?,
        Some("export") => export(&store, env::args().nth(2))?,
        Some(other) => {
            eprintln!("unknown command: {other}");
            eprintln!("usage: adagio [scan | list [term] | export [path]]");
        }
    }

    store.close();
    Ok(())
}

/// Scan the configured roots (or the host defaults) and block until the
/// worker reports completion.
fn scan(settings: &Settings, store: &Arc<MusicStore>) {
    let roots = if settings.library.scan_roots.is_empty() {
        scanner::default_scan_roots()
    } else {
        settings.library.scan_roots.clone()
    };
    if roots.is_empty() {
        eprintln!("no scan roots found; set library.scan_roots in the config");
        return;
    }
    for root in &roots {
        info!(root = %root.display(), "scanning");
    }

    let (tx, rx) = mpsc::channel();
    let worker = scanner::spawn_scan(roots, Arc::clone(store), tx);
    for event in rx {
        match event {
            ScanEvent::Progress { processed, total } => {
                info!(processed, total, "scan progress");
            }
            ScanEvent::Done(summary) => {
                println!(
                    "scan complete: {} indexed, {} failed",
                    summary.added, summary.failures
                );
                for err in &summary.sample_errors {
                    eprintln!("  {err}");
                }
            }
        }
    }
    let _ = worker.join();
}

/// Print the catalog, optionally narrowed by a search term.
fn list(store: &MusicStore, term: Option<String>) -> Result<(), adagio::store::StoreError> {
    let tracks = store.query(SearchFilter::All, term.as_deref())?;
    for track in &tracks {
        let mins = (track.duration_secs / 60.0) as u64;
        let secs = (track.duration_secs % 60.0) as u64;
        println!("{:>5}  {:>3}:{:02}  {}", track.id, mins, secs, track.display());
    }
    println!("{} tracks", tracks.len());
    Ok(())
}

/// Dump the whole catalog as JSON.
fn export(store: &MusicStore, path: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let path = path.unwrap_or_else(|| "music_library_export.json".to_string());
    let file = File::create(&path)?;
    let count = store.export_json(BufWriter::new(file))?;
    println!("exported {count} tracks to {path}");
    Ok(())
}
