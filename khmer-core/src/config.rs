//! Runtime configuration (spec §4.5, §6).
//!
//! Grounded on `libchinese_core::Config`: a plain `serde`-derived struct
//! with a `Default` impl carrying the documented defaults, plus small
//! `toml`-backed load/save helpers. Unlike the dictionary's baked costs,
//! these knobs govern engine *behavior* and are never written into the
//! `.kdict` blob.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

/// The six boolean toggles of spec §6 plus the numeric knobs §4.5 adds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Use per-word costs from the frequency source; otherwise every
    /// dictionary hit is charged `default_cost`.
    pub enable_frequency_costs: bool,
    /// Offline builder only: also emit Ta/Da and Ro-subscript variants.
    pub enable_variant_generation: bool,
    /// Transition 1 of §4.2 (orphaned subscript / isolated vowel repair).
    pub enable_repair_mode: bool,
    /// Transition 4 of §4.2 (acronym runs like "ស.ភ.ភ.ព.").
    pub enable_acronym_detection: bool,
    /// The unknown-merge post-pass of §4.2.
    pub enable_unknown_merging: bool,
    /// The §4.1 normalization pipeline; when off, raw input reaches the
    /// engine unchanged.
    pub enable_normalization: bool,
    /// Added to `unknown_cost` for the forced repair transition.
    pub repair_cost_bump: f32,
    /// Size hint, in bytes, used to pre-size the per-call scratch buffers.
    pub arena_hint_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            enable_frequency_costs: true,
            enable_variant_generation: true,
            enable_repair_mode: true,
            enable_acronym_detection: true,
            enable_unknown_merging: true,
            enable_normalization: true,
            repair_cost_bump: 50.0,
            arena_hint_bytes: 32 * 1024,
        }
    }
}

impl Config {
    /// Parse a TOML document into a `Config`, falling back to
    /// [`Default::default`] for any field the document omits.
    pub fn from_toml_str(text: &str) -> Result<Config, toml::de::Error> {
        toml::from_str(text)
    }

    /// Serialize to a TOML document.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Load a `Config` from a TOML file on disk.
    pub fn load_toml<P: AsRef<Path>>(path: P) -> io::Result<Config> {
        let text = fs::read_to_string(path)?;
        Config::from_toml_str(&text)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Save a `Config` to a TOML file on disk.
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let text = self
            .to_toml_string()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, text)
    }
}
