//! Offline dictionary builder, grounded on `tools/src/convert_table.rs`
//! and `tools/src/main.rs`: reads a plain word list (optionally paired
//! with a legacy per-word frequency file) and writes a baked
//! `khmer_dictionary.kdict` blob.
//!
//! Variant generation (Ta/Da and Ro-subscript positional swaps) is a
//! deliberate simplification carried over from the reference pipeline:
//! the Ro-subscript generator only recognizes adjacent subscript units
//! that are each exactly 6 bytes (`COENG` + one 3-byte Khmer codepoint),
//! which covers every subscript this script can produce, but would
//! silently skip a hypothetically longer subscript encoding. This is
//! intentional, not an oversight — see the design notes this port keeps
//! around the baked dictionary format.

use anyhow::{ensure, Context, Result};
use clap::Parser;
use khmer_core::{classify, Config};
use std::collections::HashMap;
use std::path::PathBuf;

const TA: u32 = 0x178F;
const DA: u32 = 0x178A;
const RO: u32 = 0x179A;
const COENG: u32 = 0x17D2;
const FILTERED_CODEPOINT: u32 = 0x17F7;

#[derive(Parser)]
#[command(name = "build-dict")]
struct Args {
    /// Plain `khmer_dictionary_words.txt`-style word list.
    #[arg(long)]
    words: PathBuf,

    /// Optional legacy `khmer_frequencies.bin` per-word cost source.
    #[arg(long)]
    frequencies: Option<PathBuf>,

    #[arg(long, default_value = "khmer_dictionary.kdict")]
    out: PathBuf,

    /// Penalty charged to a dictionary word with no frequency entry.
    #[arg(long, default_value_t = 8.0)]
    default_cost: f32,

    /// Penalty charged to an unrecognized cluster at runtime.
    #[arg(long, default_value_t = 10.0)]
    unknown_cost: f32,

    /// TOML file to read `enable_frequency_costs` / `enable_variant_generation`
    /// from; defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    run(&Args::parse())
}

fn run(args: &Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => Config::load_toml(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?,
        None => Config::default(),
    };

    let words = read_word_file(&args.words)
        .with_context(|| format!("failed to read word list {}", args.words.display()))?;
    tracing::info!(count = words.len(), "read filtered word list");

    let freq_map = if config.enable_frequency_costs {
        match &args.frequencies {
            Some(path) => Some(
                read_frequency_file(path)
                    .with_context(|| format!("failed to read frequency file {}", path.display()))?,
            ),
            None => None,
        }
    } else {
        None
    };

    let mut entries: Vec<(Vec<u8>, f32)> = Vec::with_capacity(words.len());
    for word in &words {
        let cost = freq_map
            .as_ref()
            .and_then(|m| m.get(word.as_slice()).copied())
            .unwrap_or(args.default_cost);
        entries.push((word.clone(), cost));
    }

    if config.enable_variant_generation {
        let mut variants = Vec::new();
        for (word, cost) in &entries {
            if let Some(v) = ta_da_variant(word) {
                variants.push((v, *cost));
            }
            if let Some(v) = ro_subscript_variant(word) {
                variants.push((v, *cost));
            }
        }
        tracing::info!(count = variants.len(), "generated Ta/Da and Ro-subscript variants");
        entries.extend(variants);
    }

    let blob = khmer_core::dictionary::build(&entries, args.default_cost, args.unknown_cost);
    std::fs::write(&args.out, &blob)
        .with_context(|| format!("failed to write dictionary blob to {}", args.out.display()))?;
    tracing::info!(
        path = %args.out.display(),
        bytes = blob.len(),
        entries = entries.len(),
        "wrote dictionary blob"
    );
    Ok(())
}

fn encode3(cp: u32) -> [u8; 3] {
    let mut buf = [0u8; 4];
    let s = char::from_u32(cp).unwrap().encode_utf8(&mut buf);
    let b = s.as_bytes();
    [b[0], b[1], b[2]]
}

fn contains_codepoint(bytes: &[u8], target: u32) -> bool {
    let mut i = 0;
    while i < bytes.len() {
        let (cp, len) = classify::decode_char(bytes, i);
        if cp == target {
            return true;
        }
        i += len;
    }
    false
}

/// Spec §6's plain word-file filters: single-byte-codepoint words that
/// are not a valid base character, words opening with a stray subscript
/// marker, and words containing U+17F7.
fn is_filtered_word(word: &[u8]) -> bool {
    if word.len() == 1 {
        let (cp, _) = classify::decode_char(word, 0);
        if !classify::is_valid_base_char(cp) {
            return true;
        }
    }
    if word.starts_with(&encode3(COENG)) {
        return true;
    }
    contains_codepoint(word, FILTERED_CODEPOINT)
}

fn read_word_file(path: &std::path::Path) -> Result<Vec<Vec<u8>>> {
    let text = std::fs::read_to_string(path)?;
    let mut out = Vec::new();
    for line in text.lines() {
        // `str::lines` already strips a trailing \r\n or \n; spec's "CR
        // and LF stripped" requirement is satisfied by this alone.
        if line.is_empty() {
            continue;
        }
        let bytes = line.as_bytes();
        if is_filtered_word(bytes) {
            continue;
        }
        out.push(bytes.to_vec());
    }
    Ok(out)
}

/// Legacy `khmer_frequencies.bin` reader (spec §6): `"KLIB"`, `u32
/// version`, `f32 default_cost`, `f32 unknown_cost`, `u32 entry_count`,
/// then `entry_count` records of `u16 word_len`, `word_len` bytes, `f32
/// cost`.
fn read_frequency_file(path: &std::path::Path) -> Result<HashMap<Vec<u8>, f32, ahash::RandomState>> {
    let bytes = std::fs::read(path)?;
    ensure!(bytes.len() >= 20, "frequency file shorter than its own header");
    ensure!(&bytes[0..4] == b"KLIB", "bad frequency file magic");
    let version = u32::from_le_bytes(bytes[4..8].try_into().unwrap());
    ensure!(version == 1, "unsupported frequency file version {version}");
    let entry_count = u32::from_le_bytes(bytes[16..20].try_into().unwrap());

    let mut map = HashMap::with_capacity_and_hasher(entry_count as usize, ahash::RandomState::new());
    let mut pos = 20usize;
    for _ in 0..entry_count {
        ensure!(pos + 2 <= bytes.len(), "truncated frequency file (word length)");
        let word_len = u16::from_le_bytes(bytes[pos..pos + 2].try_into().unwrap()) as usize;
        pos += 2;
        ensure!(pos + word_len + 4 <= bytes.len(), "truncated frequency file (entry)");
        let word = bytes[pos..pos + word_len].to_vec();
        pos += word_len;
        let cost = f32::from_le_bytes(bytes[pos..pos + 4].try_into().unwrap());
        pos += 4;
        map.insert(word, cost);
    }
    Ok(map)
}

/// Swap every Ta (U+178F) with Da (U+178A) and vice versa. `None` if the
/// word contains neither.
fn ta_da_variant(word: &[u8]) -> Option<Vec<u8>> {
    let ta = encode3(TA);
    let da = encode3(DA);
    let mut out = Vec::with_capacity(word.len());
    let mut changed = false;
    let mut i = 0;
    while i < word.len() {
        if word[i..].starts_with(&ta) {
            out.extend_from_slice(&da);
            i += 3;
            changed = true;
        } else if word[i..].starts_with(&da) {
            out.extend_from_slice(&ta);
            i += 3;
            changed = true;
        } else {
            out.push(word[i]);
            i += 1;
        }
    }
    changed.then_some(out)
}

/// Find one pair of adjacent 6-byte subscript units (`COENG` + base)
/// where exactly one targets Ro, and emit the byte-swapped order as a
/// positional variant. See the module doc comment for why this only
/// looks at 6-byte subscript units.
fn ro_subscript_variant(word: &[u8]) -> Option<Vec<u8>> {
    let coeng = encode3(COENG);
    let ro = encode3(RO);
    let mut i = 0;
    while i + 12 <= word.len() {
        let first = &word[i..i + 6];
        let second = &word[i + 6..i + 12];
        if first.starts_with(&coeng) && second.starts_with(&coeng) {
            let first_is_ro = first[3..6] == ro;
            let second_is_ro = second[3..6] == ro;
            if first_is_ro != second_is_ro {
                let mut out = word[..i].to_vec();
                out.extend_from_slice(second);
                out.extend_from_slice(first);
                out.extend_from_slice(&word[i + 12..]);
                return Some(out);
            }
        }
        i += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enc(cp: u32) -> Vec<u8> {
        char::from_u32(cp).unwrap().to_string().into_bytes()
    }

    #[test]
    fn filters_single_byte_non_base_words() {
        assert!(is_filtered_word(b"a"));
    }

    #[test]
    fn filters_words_starting_with_stray_coeng() {
        let mut w = enc(COENG);
        w.extend(enc(0x1780));
        assert!(is_filtered_word(&w));
    }

    #[test]
    fn filters_words_containing_17f7() {
        let mut w = enc(0x1780);
        w.extend(enc(FILTERED_CODEPOINT));
        assert!(is_filtered_word(&w));
    }

    #[test]
    fn ta_da_variant_swaps_both_directions() {
        let mut w = enc(0x1780);
        w.extend(enc(TA));
        let variant = ta_da_variant(&w).unwrap();
        let mut expected = enc(0x1780);
        expected.extend(enc(DA));
        assert_eq!(variant, expected);
    }

    #[test]
    fn ta_da_variant_none_when_absent() {
        let w = enc(0x1780);
        assert!(ta_da_variant(&w).is_none());
    }

    #[test]
    fn ro_subscript_variant_swaps_adjacent_units() {
        let mut w = enc(0x1780);
        w.extend(enc(COENG));
        w.extend(enc(RO));
        w.extend(enc(COENG));
        w.extend(enc(0x1781));
        let variant = ro_subscript_variant(&w).unwrap();

        let mut expected = enc(0x1780);
        expected.extend(enc(COENG));
        expected.extend(enc(0x1781));
        expected.extend(enc(COENG));
        expected.extend(enc(RO));
        assert_eq!(variant, expected);
    }
}
