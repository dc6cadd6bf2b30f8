//! Khmer word segmentation: normalizer, Viterbi engine, rule-based
//! post-processor, and a zero-copy baked dictionary format.
//!
//! The only mutable state anywhere in this crate is the per-call dp
//! array and segment list; the dictionary is built once and then shared
//! read-only, typically behind an `Arc<Dictionary>` as [`Segmenter`]
//! does here.

pub mod classify;
pub mod cluster;
pub mod config;
pub mod dictionary;
pub mod error;
pub mod normalize;
pub mod rules;
pub mod viterbi;

pub use config::Config;
pub use dictionary::{Dictionary, OpenError};
pub use error::DictionaryError;

use std::sync::Arc;

/// U+200B (zero-width space) encoded as UTF-8: the default segment
/// separator.
pub const DEFAULT_SEPARATOR: &[u8] = &[0xE2, 0x80, 0x8B];

/// A constructed segmenter: an immutable dictionary plus configuration.
/// Cheap to clone (the dictionary is behind an `Arc`) and safe to call
/// concurrently from any number of threads (spec §5).
#[derive(Clone)]
pub struct Segmenter {
    dict: Arc<Dictionary>,
    config: Config,
}

impl Segmenter {
    pub fn new(dict: Arc<Dictionary>, config: Config) -> Segmenter {
        Segmenter { dict, config }
    }

    pub fn dictionary(&self) -> &Arc<Dictionary> {
        &self.dict
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the full pipeline (spec §2): normalize, Viterbi + backtrack,
    /// rule engine, unknown-merge, join with `separator`.
    pub fn segment_bytes(&self, raw: &[u8], separator: &[u8]) -> Vec<u8> {
        if raw.is_empty() {
            return Vec::new();
        }

        let normalized = if self.config.enable_normalization {
            normalize::normalize(raw)
        } else {
            raw.to_vec()
        };

        let mut segments = viterbi::run(&normalized, &self.dict, &self.config);
        rules::apply(&normalized, &mut segments);
        if self.config.enable_unknown_merging {
            viterbi::merge_unknown(&normalized, &self.dict, &mut segments);
        }

        viterbi::join(&normalized, &segments, separator)
    }

    /// Convenience wrapper over [`Segmenter::segment_bytes`] for `&str`
    /// input, joined with [`DEFAULT_SEPARATOR`].
    pub fn segment(&self, text: &str) -> String {
        let out = self.segment_bytes(text.as_bytes(), DEFAULT_SEPARATOR);
        // `normalize` and the join step only ever copy whole codepoints
        // out of a buffer that started as valid UTF-8 (`text`), so the
        // result is valid UTF-8 by construction.
        String::from_utf8(out).expect("segment() preserves UTF-8 validity for str input")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segmenter_with(entries: &[(&str, f32)]) -> Segmenter {
        let owned: Vec<(Vec<u8>, f32)> = entries
            .iter()
            .map(|(w, c)| (w.as_bytes().to_vec(), *c))
            .collect();
        let blob = dictionary::build(&owned, 8.0, 10.0);
        let dict = Arc::new(Dictionary::from_bytes(blob).unwrap());
        Segmenter::new(dict, Config::default())
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let seg = segmenter_with(&[]);
        assert_eq!(seg.segment(""), "");
    }

    #[test]
    fn compound_plus_single_word() {
        let seg = segmenter_with(&[("កងកម្លាំង", 1.0), ("រក្សា", 1.0), ("សន្តិសុខ", 1.0)]);
        let out = seg.segment("កងកម្លាំងរក្សាសន្តិសុខ");
        let parts: Vec<&str> = out.split('\u{200B}').collect();
        assert_eq!(parts, vec!["កងកម្លាំង", "រក្សា", "សន្តិសុខ"]);
    }

    #[test]
    fn separator_never_appears_inside_a_segment() {
        let seg = segmenter_with(&[("កង", 1.0)]);
        let out = seg.segment("កង កង");
        for part in out.split('\u{200B}') {
            assert!(!part.contains('\u{200B}'));
        }
    }
}
