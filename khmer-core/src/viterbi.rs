//! The cost-minimizing shortest-path segmentation engine (spec §4.2).
//!
//! Mirrors the shape of the teacher's beam-search DP in
//! `libpinyin/src/parser.rs` — a forward pass filling a flat dp array
//! followed by a backtrack — generalized from pinyin-syllable candidates
//! to the six Khmer transition kinds below. Segments are represented as
//! `(start, end)` byte ranges into the normalized buffer, same as
//! [`crate::rules`], so the rule engine and this module share one
//! representation with no conversion step between them.

use crate::classify;
use crate::cluster;
use crate::config::Config;
use crate::dictionary::{self, Dictionary};

const COENG: u32 = 0x17D2;
const KHMER_BLOCK_START: u32 = 0x1780;
const KHMER_BLOCK_END: u32 = 0x17FF;

/// One dp array slot: accumulated cost to reach this byte offset, and the
/// offset the minimum-cost path arrived from.
#[derive(Debug, Clone, Copy)]
struct DpEntry {
    cost: f32,
    prev: i32,
}

/// Run the forward pass and backtrack, returning the initial segment
/// list (spec §4.2, before the rule engine and unknown-merge run).
pub fn run(normalized: &[u8], dict: &Dictionary, cfg: &Config) -> Vec<(usize, usize)> {
    let n = normalized.len();
    if n == 0 {
        return Vec::new();
    }

    let mut dp = vec![DpEntry { cost: f32::INFINITY, prev: -1 }; n + 1];
    dp[0] = DpEntry { cost: 0.0, prev: -1 };

    let mut i = 0;
    let mut prev_cp: u32 = 0;
    while i < n {
        let (cp, char_len) = classify::decode_char(normalized, i);
        if dp[i].cost.is_finite() {
            evaluate_transitions(normalized, i, cp, char_len, prev_cp, dict, cfg, &mut dp);
        }
        prev_cp = cp;
        i += char_len;
    }

    backtrack(&dp, n)
}

fn relax(dp: &mut [DpEntry], i: usize, j: usize, cost: f32) {
    let candidate = dp[i].cost + cost;
    if candidate < dp[j].cost {
        dp[j].cost = candidate;
        dp[j].prev = i as i32;
    }
}

#[allow(clippy::too_many_arguments)]
fn evaluate_transitions(
    bytes: &[u8],
    i: usize,
    cp: u32,
    char_len: usize,
    prev_cp: u32,
    dict: &Dictionary,
    cfg: &Config,
    dp: &mut Vec<DpEntry>,
) {
    // 1. Repair: forced, exclusive transition.
    if cfg.enable_repair_mode {
        let orphan_subscript = prev_cp == COENG && classify::is_consonant(cp);
        let isolated_vowel = classify::is_dep_vowel(cp);
        if orphan_subscript || isolated_vowel {
            relax(dp, i, i + char_len, dict.unknown_cost() + cfg.repair_cost_bump);
            return;
        }
    }

    // 2. Number / currency group. A digit at i consumes the maximal run on
    // its own. A currency prefix only reaches the first digit; the run
    // itself is picked up when the forward pass reaches that digit, since
    // `is_digit(cp)` alone triggers the branch above it.
    if classify::is_digit(cp) {
        let end = number_group_end(bytes, i, char_len);
        relax(dp, i, end, 1.0);
    } else if classify::is_currency_prefix(cp) {
        let (next_cp, _) = classify::decode_char(bytes, i + char_len);
        if classify::is_digit(next_cp) {
            relax(dp, i, i + char_len, 1.0);
        }
    }

    // 3. Separator. Digits are never SEPARATOR class, so this never
    // competes with the digit-run transition above; a currency prefix that
    // is also SEPARATOR class (e.g. `$`) must still reach i + char_len
    // through this transition, so rule 2 firing on it must not suppress it.
    if classify::is_separator(cp) {
        relax(dp, i, i + char_len, 0.1);
    }

    // 4. Acronym.
    if cfg.enable_acronym_detection {
        if let Some(end) = acronym_end(bytes, i, cp) {
            relax(dp, i, end, dict.default_cost());
        }
    }

    // 5. Dictionary, incremental hash.
    dictionary_transitions(bytes, i, dict, dp);

    // 6. Unknown cluster, always proposed as a fallback.
    let fallback_len = if classify::is_cluster_start(cp) {
        cluster::cluster_len(bytes, i)
    } else {
        char_len
    };
    let mut cost = dict.unknown_cost();
    let single_codepoint = fallback_len == char_len;
    let in_khmer_block = (KHMER_BLOCK_START..=KHMER_BLOCK_END).contains(&cp);
    if single_codepoint && in_khmer_block && !classify::is_valid_base_char(cp) {
        cost += 10.0;
    }
    relax(dp, i, i + fallback_len, cost);
}

/// Given that the codepoint at `i` (length `char_len`) is already known to
/// be a digit, returns the byte offset just past the maximal digit run
/// starting there, permitting single interior separators from {`,`, `.`,
/// space} each followed by another digit (spec §4.2 transition 2).
fn number_group_end(bytes: &[u8], i: usize, char_len: usize) -> usize {
    let mut cursor = i + char_len;
    loop {
        let (next_cp, next_len) = classify::decode_char(bytes, cursor);
        if classify::is_digit(next_cp) {
            // Plain digit run: keep consuming.
            cursor += next_len;
            continue;
        }
        if classify::is_number_group_separator(next_cp) {
            let (after_cp, _) = classify::decode_char(bytes, cursor + next_len);
            if classify::is_digit(after_cp) {
                cursor += next_len;
                continue;
            }
        }
        break;
    }
    cursor
}

/// If `i` begins a cluster immediately followed by `.`, returns the end
/// offset of the maximal `(cluster '.')+` run (spec §4.2 transition 4).
fn acronym_end(bytes: &[u8], i: usize, cp: u32) -> Option<usize> {
    if !classify::is_cluster_start(cp) {
        return None;
    }
    let clen = cluster::cluster_len(bytes, i);
    let mut cursor = i + clen;
    if bytes.get(cursor) != Some(&b'.') {
        return None;
    }
    cursor += 1;

    loop {
        let (next_cp, _) = classify::decode_char(bytes, cursor);
        if !classify::is_cluster_start(next_cp) {
            break;
        }
        let next_len = cluster::cluster_len(bytes, cursor);
        let after = cursor + next_len;
        if bytes.get(after) == Some(&b'.') {
            cursor = after + 1;
        } else {
            break;
        }
    }
    Some(cursor)
}

/// Extends a DJB2 hash one codepoint at a time from `i`, probing the
/// dictionary at every prefix length up to `max_word_length` (spec §4.2
/// transition 5, §4.4 "Incremental lookup").
fn dictionary_transitions(bytes: &[u8], i: usize, dict: &Dictionary, dp: &mut [DpEntry]) {
    let max_len = dict.max_word_length() as usize;
    if max_len == 0 {
        return;
    }

    let mut hash = dictionary::DJB2_INIT;
    let mut cursor = i;
    loop {
        if cursor >= bytes.len() {
            break;
        }
        let (_, clen) = classify::decode_char(bytes, cursor);
        if cursor + clen - i > max_len {
            break;
        }
        for &b in &bytes[cursor..cursor + clen] {
            hash = dictionary::djb2_step(hash, b);
        }
        cursor += clen;
        if let Some(cost) = dict.probe(hash, &bytes[i..cursor]) {
            relax(dp, i, cursor, cost);
        }
    }
}

fn backtrack(dp: &[DpEntry], n: usize) -> Vec<(usize, usize)> {
    if !dp[n].cost.is_finite() {
        return vec![(0, n)];
    }
    let mut segments = Vec::new();
    let mut curr = n;
    while curr != 0 {
        let prev = dp[curr].prev as usize;
        segments.push((prev, curr));
        curr = prev;
    }
    segments.reverse();
    segments
}

/// A segment is "known" per spec §4.2's unknown-merge classification.
pub fn is_known_segment(bytes: &[u8], dict: &Dictionary, seg: (usize, usize)) -> bool {
    let (start, end) = seg;
    let slice = &bytes[start..end];
    let (cp0, clen0) = classify::decode_char(bytes, start);

    if classify::is_separator(cp0) && (end - start) <= 4 {
        return true;
    }
    if classify::is_digit(cp0) {
        return true;
    }
    if dict.lookup(slice).is_some() {
        return true;
    }
    if clen0 == end - start && classify::is_valid_base_char(cp0) {
        return true;
    }
    if end - start >= 2 && slice.contains(&b'.') {
        return true;
    }
    false
}

/// Coalesce adjacent non-known segments into one, preserving order
/// (spec §4.2 "Unknown-merge post-pass").
pub fn merge_unknown(bytes: &[u8], dict: &Dictionary, segments: &mut Vec<(usize, usize)>) {
    if segments.is_empty() {
        return;
    }
    let mut out: Vec<(usize, usize)> = Vec::with_capacity(segments.len());
    let mut out_known: Vec<bool> = Vec::with_capacity(segments.len());

    for &seg in segments.iter() {
        let known = is_known_segment(bytes, dict, seg);
        if !known && !out_known.is_empty() && !*out_known.last().unwrap() {
            let last = out.last_mut().unwrap();
            *last = (last.0, seg.1);
        } else {
            out.push(seg);
            out_known.push(known);
        }
    }

    *segments = out;
}

/// Join segment byte ranges with `separator` (spec §4.2 "Output").
pub fn join(bytes: &[u8], segments: &[(usize, usize)], separator: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len() + segments.len().saturating_sub(1) * separator.len());
    for (idx, seg) in segments.iter().enumerate() {
        if idx > 0 {
            out.extend_from_slice(separator);
        }
        out.extend_from_slice(&bytes[seg.0..seg.1]);
    }
    out
}
