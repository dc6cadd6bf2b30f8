//! Quantified invariants (spec §8), in the style of `harryzorus-sorex`'s
//! `tests/property/*.rs`: a handful of small custom `Strategy`s feeding
//! `proptest!` blocks of `prop_*` functions, rather than hand-enumerated
//! example vectors.

use khmer_core::{dictionary, normalize, Config, Dictionary, Segmenter};
use proptest::prelude::*;
use std::sync::Arc;
use std::thread;

/// Arbitrary bytes, including invalid UTF-8 — exercises the
/// malformed-input tolerance required by spec §3/§7.
fn arb_bytes() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..64)
}

/// Text built only from Khmer-block codepoints plus ASCII space/digits/
/// punctuation, which is where the interesting transitions (clusters,
/// number groups, separators) actually fire.
fn arb_khmer_text() -> impl Strategy<Value = String> {
    let khmer_cp = (0x1780u32..=0x17FFu32).prop_filter_map("valid scalar", char::from_u32);
    let ascii_cp = prop::char::range('\0', '\u{7E}');
    prop::collection::vec(prop_oneof![khmer_cp, ascii_cp], 0..40)
        .prop_map(|chars| chars.into_iter().collect())
}

fn sample_dictionary() -> Dictionary {
    let entries = vec![
        ("កង".as_bytes().to_vec(), 2.0),
        ("កងកម្លាំង".as_bytes().to_vec(), 1.0),
        ("រក្សា".as_bytes().to_vec(), 3.0),
    ];
    Dictionary::from_bytes(dictionary::build(&entries, 8.0, 10.0)).unwrap()
}

proptest! {
    /// Coverage: concatenating every produced segment reproduces
    /// `normalize(x)` exactly.
    #[test]
    fn prop_segments_cover_normalized_input(text in arb_khmer_text()) {
        let dict = Arc::new(sample_dictionary());
        let seg = Segmenter::new(dict, Config::default());
        let out = seg.segment(&text);
        let rebuilt: String = out.split('\u{200B}').collect::<Vec<_>>().join("");
        let normalized = String::from_utf8(normalize::normalize(text.as_bytes())).unwrap();
        prop_assert_eq!(rebuilt, normalized);
    }

    /// Determinism across repeated calls on the same shared segmenter.
    #[test]
    fn prop_determinism_across_calls(text in arb_khmer_text()) {
        let dict = Arc::new(sample_dictionary());
        let seg = Segmenter::new(dict, Config::default());
        let a = seg.segment(&text);
        let b = seg.segment(&text);
        prop_assert_eq!(a, b);
    }

    /// Normalizer idempotence: `normalize(normalize(x)) == normalize(x)`.
    #[test]
    fn prop_normalizer_idempotent(bytes in arb_bytes()) {
        let once = normalize::normalize(&bytes);
        let twice = normalize::normalize(&once);
        prop_assert_eq!(once, twice);
    }

    /// Dictionary round trip: every inserted word looks itself up; a
    /// word never inserted never does (checked against a disjoint key).
    #[test]
    fn prop_dictionary_round_trip(words in prop::collection::vec("[a-z]{1,12}", 0..30)) {
        let mut seen = std::collections::HashSet::new();
        let entries: Vec<(Vec<u8>, f32)> = words
            .iter()
            .filter(|w| seen.insert((*w).clone()))
            .enumerate()
            .map(|(i, w)| (w.as_bytes().to_vec(), i as f32))
            .collect();
        let dict = Dictionary::from_bytes(dictionary::build(&entries, 8.0, 10.0)).unwrap();
        for (word, cost) in &entries {
            prop_assert_eq!(dict.lookup(word), Some(*cost));
        }
        prop_assert_eq!(dict.lookup(b"zzzzzzzzzzzzzzzzzzzzzzzz"), None);
    }

    /// Separator safety: splitting the output on U+200B reconstructs the
    /// segment list exactly, because U+200B never survives normalization
    /// inside a segment.
    #[test]
    fn prop_separator_never_appears_inside_a_segment(text in arb_khmer_text()) {
        let dict = Arc::new(sample_dictionary());
        let seg = Segmenter::new(dict, Config::default());
        let out = seg.segment(&text);
        for part in out.split('\u{200B}') {
            prop_assert!(!part.contains('\u{200B}'));
        }
    }

    /// Immutability under concurrency: the same dictionary shared across
    /// 1 vs 64 threads produces byte-identical output for the same input.
    #[test]
    fn prop_immutable_under_concurrency(text in arb_khmer_text()) {
        let dict = Arc::new(sample_dictionary());
        let seg = Segmenter::new(dict, Config::default());

        let baseline = seg.segment(&text);

        let handles: Vec<_> = (0..64)
            .map(|_| {
                let seg = seg.clone();
                let text = text.clone();
                thread::spawn(move || seg.segment(&text))
            })
            .collect();

        for h in handles {
            let result = h.join().unwrap();
            prop_assert_eq!(result, baseline.clone());
        }
    }
}
