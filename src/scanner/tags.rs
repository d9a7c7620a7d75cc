use std::path::Path;

use lofty::file::{AudioFile, TaggedFileExt};
use lofty::tag::ItemKey;
use tracing::debug;

use crate::store::TrackInfo;

use super::walk::is_supported;

/// Capability seam for container-specific tag extraction.
///
/// A reader either produces a normalized [`TrackInfo`] or signals
/// "unavailable" with `None`; selection happens by extension, never by
/// runtime probing of the parsed object.
pub trait TagReader {
    /// Whether this reader should be attempted for `path`.
    fn supports(&self, path: &Path) -> bool;
    /// Best-effort read; `None` means the container gave us nothing usable.
    fn read(&self, path: &Path) -> Option<TrackInfo>;
}

/// Tag reader backed by `lofty`, covering every supported container.
pub struct LoftyReader;

impl TagReader for LoftyReader {
    fn supports(&self, path: &Path) -> bool {
        is_supported(path)
    }

    fn read(&self, path: &Path) -> Option<TrackInfo> {
        let tagged = lofty::read_from_path(path).ok()?;

        let mut info = TrackInfo::empty(path.to_path_buf());

        let props = tagged.properties();
        info.duration_secs = props.duration().as_secs_f64();
        info.bitrate = props.audio_bitrate().unwrap_or(0);
        info.sample_rate = props.sample_rate().unwrap_or(0);
        info.channels = props.channels().map(u32::from).unwrap_or(0);

        if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
            if let Some(v) = tag.get_string(&ItemKey::TrackTitle) {
                info.title = v.trim().to_string();
            }
            if let Some(v) = tag.get_string(&ItemKey::TrackArtist) {
                info.artist = v.trim().to_string();
            }
            if let Some(v) = tag.get_string(&ItemKey::AlbumTitle) {
                info.album = v.trim().to_string();
            }
            if let Some(v) = tag.get_string(&ItemKey::Genre) {
                info.genre = v.trim().to_string();
            }
            if let Some(v) = tag.get_string(&ItemKey::TrackNumber) {
                // "3/12" style values are common; take the leading number.
                info.track_no = leading_number(v);
            }
            if let Some(v) = tag.get_string(&ItemKey::Year) {
                info.year = leading_number(v);
            }
        }

        if info.title.is_empty() {
            // A readable container with no title tag still needs a usable
            // display name; borrow the filename heuristics.
            let fallback = fallback_info(path);
            info.title = fallback.title;
            if info.artist.is_empty() {
                info.artist = fallback.artist;
            }
        }

        Some(info)
    }
}

fn leading_number(s: &str) -> u32 {
    let digits: String = s.trim().chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}

/// Derive track info from the filename alone.
///
/// A stem containing the literal separator `" - "` splits into
/// (artist, title); otherwise the stem is the title and the artist is
/// "Unknown Artist". Technical fields stay at 0.
fn fallback_info(path: &Path) -> TrackInfo {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Unknown")
        .to_string();

    let mut info = TrackInfo::empty(path.to_path_buf());
    match stem.split_once(" - ") {
        Some((artist, title)) => {
            info.artist = artist.trim().to_string();
            info.title = title.trim().to_string();
        }
        None => {
            info.artist = "Unknown Artist".to_string();
            info.title = stem;
        }
    }
    info
}

/// Extract metadata for one file. Never fails: tag-based extraction is
/// attempted first, any failure falls back to filename-derived info, and
/// filesystem facts (size, mtime) are filled in from `fs::metadata` when
/// available.
pub fn extract_info(path: &Path) -> TrackInfo {
    let reader = LoftyReader;
    let mut info = if reader.supports(path) {
        reader.read(path).unwrap_or_else(|| {
            debug!(path = %path.display(), "tags unreadable, using filename fallback");
            fallback_info(path)
        })
    } else {
        fallback_info(path)
    };

    if let Ok(meta) = std::fs::metadata(path) {
        info.file_size = meta.len();
        if let Ok(modified) = meta.modified() {
            if let Ok(since_epoch) = modified.duration_since(std::time::UNIX_EPOCH) {
                info.modified_at = since_epoch.as_secs() as i64;
            }
        }
    }

    info
}
