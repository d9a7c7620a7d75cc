//! Equalizer state: band gains, presets and the enabled flag.
//!
//! Pure state holder; applying the curve to an audio chain is the output
//! backend's concern. Gains are clamped to ±12 dB; selecting a preset
//! overwrites every band atomically, and editing any single band afterwards
//! drops the state back to "custom".

pub const BAND_COUNT: usize = 10;

/// ISO-style octave band centers, in Hz.
pub const BAND_FREQUENCIES: [f32; BAND_COUNT] = [
    31.0, 62.0, 125.0, 250.0, 500.0, 1000.0, 2000.0, 4000.0, 8000.0, 16000.0,
];

pub const MIN_GAIN_DB: f32 = -12.0;
pub const MAX_GAIN_DB: f32 = 12.0;

/// Fixed preset table, applied atomically by id.
const PRESETS: [(&str, [f32; BAND_COUNT]); 6] = [
    ("flat", [0.0; BAND_COUNT]),
    (
        "pop",
        [-1.0, 1.0, 3.0, 4.0, 3.0, 1.0, 0.0, -1.0, -1.0, -2.0],
    ),
    (
        "rock",
        [4.0, 3.0, 1.0, -1.0, -2.0, -1.0, 1.0, 3.0, 4.0, 4.0],
    ),
    (
        "jazz",
        [2.0, 1.0, 0.0, 1.0, -1.0, -1.0, 0.0, 1.0, 2.0, 3.0],
    ),
    (
        "classical",
        [3.0, 2.0, 0.0, 0.0, 0.0, 0.0, -2.0, -2.0, -2.0, -4.0],
    ),
    (
        "bass_boost",
        [6.0, 5.0, 4.0, 2.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    ),
];

/// Immutable snapshot of the equalizer, as handed to a renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct EqualizerState {
    pub enabled: bool,
    /// Active preset id; `None` means custom (at least one band was edited).
    pub preset: Option<String>,
    /// Gain in dB per band, ordered by [`BAND_FREQUENCIES`].
    pub gains: [f32; BAND_COUNT],
}

#[derive(Debug)]
pub struct Equalizer {
    state: EqualizerState,
}

impl Default for Equalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Equalizer {
    pub fn new() -> Self {
        Self {
            state: EqualizerState {
                enabled: false,
                preset: Some("flat".to_string()),
                gains: [0.0; BAND_COUNT],
            },
        }
    }

    /// Known preset ids, in table order.
    pub fn preset_ids() -> impl Iterator<Item = &'static str> {
        PRESETS.iter().map(|(id, _)| *id)
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.state.enabled = enabled;
    }

    /// Overwrite all band gains from the preset table atomically.
    ///
    /// An unknown id is a no-op returning `false`, not an error.
    pub fn set_preset(&mut self, id: &str) -> bool {
        match PRESETS.iter().find(|(pid, _)| *pid == id) {
            Some((pid, gains)) => {
                self.state.gains = *gains;
                self.state.preset = Some((*pid).to_string());
                true
            }
            None => false,
        }
    }

    /// Set one band's gain, clamped to [-12, +12] dB. Any individual edit
    /// makes the curve custom (preset id becomes `None`). Out-of-range band
    /// indices are ignored.
    pub fn set_band_gain(&mut self, band: usize, gain_db: f32) {
        let Some(slot) = self.state.gains.get_mut(band) else {
            return;
        };
        *slot = gain_db.clamp(MIN_GAIN_DB, MAX_GAIN_DB);
        self.state.preset = None;
    }

    pub fn state(&self) -> EqualizerState {
        self.state.clone()
    }
}
