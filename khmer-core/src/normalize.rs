//! Canonical reordering of Khmer orthographic clusters (spec §4.1).
//!
//! `normalize` turns visual-order input into storage order so dictionary
//! lookup can use plain byte equality. It is a pure function: `bytes in,
//! bytes out`, and is idempotent by construction (re-running the sort on
//! already-sorted parts is a no-op, and pass 1's two substitutions target
//! codepoint pairs that do not reappear in their own output).

use crate::classify::{self, CharClass};
use crate::cluster::{self, Part};

const ZERO_WIDTH_SPACE: u32 = 0x200B;
const SIGN_17C1: u32 = 0x17C1;
const VOWEL_17B8: u32 = 0x17B8;
const VOWEL_17BE: u32 = 0x17BE;
const VOWEL_17B6: u32 = 0x17B6;
const VOWEL_17C4: u32 = 0x17C4;

/// Normalize `input` per spec §4.1 (pass 1 linear fixups, pass 2 cluster
/// reordering). Returns a newly allocated, owned byte string.
pub fn normalize(input: &[u8]) -> Vec<u8> {
    let pass1 = linear_prepass(input);
    cluster_reorder(&pass1)
}

fn linear_prepass(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len());
    let mut i = 0;
    while i < input.len() {
        let (cp, len) = classify::decode_char(input, i);

        if cp == ZERO_WIDTH_SPACE {
            i += len;
            continue;
        }

        if cp == SIGN_17C1 {
            let (next_cp, next_len) = classify::decode_char(input, i + len);
            if next_cp == VOWEL_17B8 {
                push_char(&mut out, VOWEL_17BE);
                i += len + next_len;
                continue;
            }
            if next_cp == VOWEL_17B6 {
                push_char(&mut out, VOWEL_17C4);
                i += len + next_len;
                continue;
            }
        }

        out.extend_from_slice(&input[i..i + len]);
        i += len;
    }
    out
}

fn push_char(out: &mut Vec<u8>, cp: u32) {
    let mut buf = [0u8; 4];
    let s = char::from_u32(cp).unwrap_or('\u{FFFD}').encode_utf8(&mut buf);
    out.extend_from_slice(s.as_bytes());
}

/// Sort priority for a non-leading cluster part (spec §4.1 table). Lower
/// sorts earlier.
fn priority(bytes: &[u8], part: Part) -> u32 {
    match part.class {
        CharClass::Coeng => {
            if cluster::coeng_target_is_ro(bytes, part) {
                20
            } else {
                10
            }
        }
        CharClass::Register => 30,
        CharClass::DepVowel => 40,
        CharClass::Sign => 50,
        CharClass::Base => 0, // never reached: base is never a non-leading part
        _ => 60,
    }
}

fn cluster_reorder(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len());
    let mut i = 0;
    while i < input.len() {
        let (cp, len) = classify::decode_char(input, i);

        if !classify::is_cluster_start(cp) {
            out.extend_from_slice(&input[i..i + len]);
            i += len;
            continue;
        }

        let parts = cluster::parse_cluster(input, i);
        let base = parts[0];
        let mut rest: Vec<Part> = parts[1..].to_vec();
        // `sort_by_key` is stable, preserving scan order among equal
        // priorities as required by spec §4.1.
        rest.sort_by_key(|p| priority(input, *p));

        out.extend_from_slice(&input[base.offset..base.offset + base.len]);
        for p in rest {
            out.extend_from_slice(&input[p.offset..p.offset + p.len]);
        }

        let total_len: usize = parts.iter().map(|p| p.len).sum();
        i += total_len;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enc(cp: u32) -> Vec<u8> {
        char::from_u32(cp).unwrap().to_string().into_bytes()
    }

    fn enc_all(cps: &[u32]) -> Vec<u8> {
        let mut out = Vec::new();
        for &cp in cps {
            out.extend(enc(cp));
        }
        out
    }

    #[test]
    fn strips_zero_width_space() {
        let input = enc_all(&[0x1780, ZERO_WIDTH_SPACE, 0x1781]);
        let expected = enc_all(&[0x1780, 0x1781]);
        assert_eq!(normalize(&input), expected);
    }

    #[test]
    fn replaces_17c1_17b8_with_17be() {
        let input = enc_all(&[SIGN_17C1, VOWEL_17B8]);
        assert_eq!(normalize(&input), enc(VOWEL_17BE));
    }

    #[test]
    fn replaces_17c1_17b6_with_17c4() {
        let input = enc_all(&[SIGN_17C1, VOWEL_17B6]);
        assert_eq!(normalize(&input), enc(VOWEL_17C4));
    }

    #[test]
    fn reorders_dep_vowel_before_sign() {
        // base, sign, dep_vowel -> base, dep_vowel, sign
        let input = enc_all(&[0x1780, 0x17C6, 0x17B6]);
        let expected = enc_all(&[0x1780, 0x17B6, 0x17C6]);
        assert_eq!(normalize(&input), expected);
    }

    #[test]
    fn reorders_register_before_dep_vowel_and_subscript_first() {
        // base, register, subscript(coeng+base), dep_vowel
        // expected order: base, subscript, register, dep_vowel
        let input = enc_all(&[0x1780, 0x17C9, 0x17D2, 0x1781, 0x17B6]);
        let expected = enc_all(&[0x1780, 0x17D2, 0x1781, 0x17C9, 0x17B6]);
        assert_eq!(normalize(&input), expected);
    }

    #[test]
    fn ro_subscript_sorts_after_other_subscripts() {
        // base, coeng+Ro, coeng+KA -> coeng+KA (prio 10) before coeng+Ro (prio 20)
        let input = enc_all(&[0x1780, 0x17D2, 0x179A, 0x17D2, 0x1781]);
        let expected = enc_all(&[0x1780, 0x17D2, 0x1781, 0x17D2, 0x179A]);
        assert_eq!(normalize(&input), expected);
    }

    #[test]
    fn idempotent_on_reordered_input() {
        let input = enc_all(&[0x1780, 0x17C6, 0x17B6, 0x17C9]);
        let once = normalize(&input);
        let twice = normalize(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn non_khmer_text_passes_through() {
        let input = b"hello world 123";
        assert_eq!(normalize(input), input.to_vec());
    }

    #[test]
    fn malformed_bytes_pass_through_without_panic() {
        let input = [0xFF, 0xFE, b'a'];
        let out = normalize(&input);
        assert_eq!(out, vec![0xFF, 0xFE, b'a']);
    }
}
