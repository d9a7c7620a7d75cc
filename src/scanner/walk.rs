use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

/// Audio extensions the scanner indexes (case-insensitive, without dot).
pub const SUPPORTED_EXTENSIONS: [&str; 8] =
    ["flac", "wav", "mp3", "ogg", "m4a", "aac", "wma", "ape"];

/// Extension membership test against the fixed format table.
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            SUPPORTED_EXTENSIONS.iter().any(|e| *e == ext)
        })
        .unwrap_or(false)
}

/// Collect supported audio files under each root.
///
/// Recursion is capped one level below the root: files directly in the root
/// and in its immediate subdirectories are found, deeper nesting is not
/// descended. Missing or unreadable roots are skipped with a warning, and
/// duplicate paths across overlapping roots are filtered.
pub fn collect_files(roots: &[PathBuf]) -> Vec<PathBuf> {
    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut files = Vec::new();

    for root in roots {
        if !root.is_dir() {
            warn!(root = %root.display(), "scan root missing or not a directory, skipping");
            continue;
        }

        // WalkDir depth: root itself is 0, its files are 1, files in an
        // immediate subdirectory are 2.
        for entry in WalkDir::new(root).max_depth(2).into_iter() {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!(root = %root.display(), error = %e, "unreadable entry, skipping");
                    continue;
                }
            };
            let path = entry.path();
            if !entry.file_type().is_file() || !is_supported(path) {
                continue;
            }
            let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
            if seen.insert(canonical) {
                files.push(path.to_path_buf());
            }
        }
    }

    files
}

/// Host-environment scan roots: the user's Music and Downloads folders,
/// filtered to those that exist.
pub fn default_scan_roots() -> Vec<PathBuf> {
    let mut roots = Vec::new();
    if let Some(d) = dirs::audio_dir() {
        roots.push(d);
    }
    if let Some(d) = dirs::download_dir() {
        roots.push(d);
    }
    if roots.is_empty() {
        if let Some(home) = dirs::home_dir() {
            roots.push(home.join("Music"));
            roots.push(home.join("Downloads"));
        }
    }
    roots.retain(|d| d.is_dir());
    roots
}
