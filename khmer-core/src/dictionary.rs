//! Baked dictionary format: build, load, and lookup (spec §4.4, §3).
//!
//! The dictionary is a single contiguous byte blob: a fixed 32-byte header,
//! an open-addressed hash table of `(name_offset, cost)` pairs, and a
//! NUL-terminated string pool. It is designed to be read once (or
//! memory-mapped) and then shared read-only across threads for the
//! lifetime of the process — there is no interior mutability anywhere in
//! this module.

use crate::error::DictionaryError;
use std::fmt;
use std::fs::File;
use std::path::Path;

const MAGIC: &[u8; 4] = b"KDIC";
const VERSION: u32 = 1;
const HEADER_LEN: usize = 32;
const SLOT_LEN: usize = 8;

/// DJB2 initial hash value (spec GLOSSARY).
pub const DJB2_INIT: u32 = 5381;

/// Fold one more byte into a running DJB2 hash.
#[inline]
pub fn djb2_step(h: u32, byte: u8) -> u32 {
    // h*33 + byte, written as (h<<5)+h to match the spec's incremental form.
    h.wrapping_shl(5).wrapping_add(h).wrapping_add(byte as u32)
}

/// DJB2 hash of a complete byte string.
pub fn djb2(bytes: &[u8]) -> u32 {
    bytes.iter().fold(DJB2_INIT, |h, &b| djb2_step(h, b))
}

/// Owning storage for a dictionary blob: either a plain `Vec<u8>` (read
/// from disk, embedded via `include_bytes!`, or built in-process) or a
/// memory-mapped file for zero-copy loading. Both are `Send + Sync`, so a
/// `Dictionary` can be wrapped in `Arc` and shared across threads exactly
/// like the teacher's `Model`/`Interpolator` values (see
/// `libchinese_core::engine::Engine`).
enum DictBytes {
    Owned(Vec<u8>),
    Mapped(memmap2::Mmap),
}

impl std::ops::Deref for DictBytes {
    type Target = [u8];
    fn deref(&self) -> &[u8] {
        match self {
            DictBytes::Owned(v) => v.as_slice(),
            DictBytes::Mapped(m) => &m[..],
        }
    }
}

/// An immutable, loaded baked dictionary.
///
/// Construction validates the blob per spec §4.4/§7: a `Dictionary` value
/// can only exist if its header and table are well-formed, so downstream
/// code never needs to re-check them on the lookup hot path.
pub struct Dictionary {
    bytes: DictBytes,
    table_offset: usize,
    pool_offset: usize,
    mask: u32,
    table_size: u32,
    num_entries: u32,
    default_cost: f32,
    unknown_cost: f32,
    max_word_length: u32,
}

/// Failure modes specific to opening a dictionary file from disk, layered
/// over `DictionaryError` (spec §7 — initialization errors propagate to
/// the host; `khmer-core` itself never retries).
#[derive(Debug)]
pub enum OpenError {
    Io(std::io::Error),
    Invalid(DictionaryError),
}

impl fmt::Display for OpenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpenError::Io(e) => write!(f, "failed to open dictionary file: {e}"),
            OpenError::Invalid(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for OpenError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OpenError::Io(e) => Some(e),
            OpenError::Invalid(e) => Some(e),
        }
    }
}

impl Dictionary {
    /// Validate and wrap an in-memory blob (already read from disk,
    /// embedded with `include_bytes!`, or produced by [`build`]).
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Dictionary, DictionaryError> {
        Self::from_dict_bytes(DictBytes::Owned(bytes))
    }

    /// Memory-map `path` and validate it as a dictionary blob. Zero-copy:
    /// the table and string pool are read directly out of the mapped
    /// pages, never duplicated into the process heap.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Dictionary, OpenError> {
        let file = File::open(path).map_err(OpenError::Io)?;
        // Safety: the mapped file is treated as immutable for the
        // lifetime of the `Dictionary`; callers must not mutate it
        // out-of-band. This mirrors the "read-only after load" contract
        // spec §4.4/§5 impose on the blob.
        let mmap = unsafe { memmap2::Mmap::map(&file) }.map_err(OpenError::Io)?;
        Self::from_dict_bytes(DictBytes::Mapped(mmap)).map_err(OpenError::Invalid)
    }

    fn from_dict_bytes(bytes: DictBytes) -> Result<Dictionary, DictionaryError> {
        let len = bytes.len();
        if len < HEADER_LEN {
            return Err(DictionaryError::Truncated { len });
        }

        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes[0..4]);
        if &magic != MAGIC {
            return Err(DictionaryError::BadMagic { found: magic });
        }

        let version = read_u32(&bytes, 4);
        if version != VERSION {
            return Err(DictionaryError::UnsupportedVersion { found: version });
        }

        let num_entries = read_u32(&bytes, 8);
        let table_size = read_u32(&bytes, 12);
        if table_size == 0 || (table_size & (table_size - 1)) != 0 {
            return Err(DictionaryError::BadTableSize { table_size });
        }

        let default_cost = read_f32(&bytes, 16);
        let unknown_cost = read_f32(&bytes, 20);
        let max_word_length = read_u32(&bytes, 24);

        let table_offset = HEADER_LEN;
        let table_bytes_len = table_size as usize * SLOT_LEN;
        let pool_offset = table_offset + table_bytes_len;
        if pool_offset >= len {
            return Err(DictionaryError::OutOfBounds {
                needed: pool_offset + 1,
                available: len,
            });
        }
        if bytes[pool_offset] != 0 {
            return Err(DictionaryError::BadStringOffset {
                offset: 0,
                pool_len: len - pool_offset,
            });
        }

        let pool_len = len - pool_offset;
        for i in 0..table_size as usize {
            let slot_off = table_offset + i * SLOT_LEN;
            let name_offset = read_u32(&bytes, slot_off);
            if name_offset == 0 {
                continue;
            }
            let word_start = pool_offset + name_offset as usize;
            if word_start >= len || !bytes[word_start..].contains(&0) {
                return Err(DictionaryError::BadStringOffset {
                    offset: name_offset,
                    pool_len,
                });
            }
        }

        let dict = Dictionary {
            bytes,
            table_offset,
            pool_offset,
            mask: table_size - 1,
            table_size,
            num_entries,
            default_cost,
            unknown_cost,
            max_word_length,
        };

        tracing::debug!(
            num_entries = dict.num_entries,
            table_size = dict.table_size,
            max_word_length = dict.max_word_length,
            "loaded khmer dictionary"
        );

        Ok(dict)
    }

    pub fn num_entries(&self) -> u32 {
        self.num_entries
    }

    pub fn table_size(&self) -> u32 {
        self.table_size
    }

    pub fn default_cost(&self) -> f32 {
        self.default_cost
    }

    pub fn unknown_cost(&self) -> f32 {
        self.unknown_cost
    }

    pub fn max_word_length(&self) -> u32 {
        self.max_word_length
    }

    /// Exact-match lookup by byte slice (spec §4.4 "Lookup by byte slice").
    pub fn lookup(&self, word: &[u8]) -> Option<f32> {
        if word.is_empty() {
            return None;
        }
        self.probe(djb2(word), word)
    }

    /// Probe the table for `word` given an already-computed hash. This is
    /// the routine the Viterbi engine's incremental dictionary transition
    /// calls once per candidate prefix length, reusing a hash extended
    /// byte-by-byte via [`djb2_step`] rather than rehashing from scratch
    /// (spec §4.4 "Incremental lookup").
    pub fn probe(&self, hash: u32, word: &[u8]) -> Option<f32> {
        if word.is_empty() {
            return None;
        }
        let mut idx = (hash & self.mask) as usize;
        loop {
            let slot_off = self.table_offset + idx * SLOT_LEN;
            let name_offset = read_u32(&self.bytes, slot_off);
            if name_offset == 0 {
                return None;
            }
            let cost = read_f32(&self.bytes, slot_off + 4);
            let word_start = self.pool_offset + name_offset as usize;

            // Fast path: first-byte compare before the full comparison.
            if self.bytes[word_start] == word[0]
                && word_start + word.len() < self.bytes.len()
                && &self.bytes[word_start..word_start + word.len()] == word
                && self.bytes[word_start + word.len()] == 0
            {
                return Some(cost);
            }

            idx = (idx + 1) & (self.mask as usize);
        }
    }
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
}

fn read_f32(bytes: &[u8], offset: usize) -> f32 {
    f32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
}

/// Build a baked dictionary blob from `(word, cost)` pairs (spec §4.4
/// "Build"). This is the offline, not-hot-path construction routine; the
/// `build-dict` tool is the primary caller, but it is kept in `khmer-core`
/// because the blob layout is part of the core's contract, not an
/// implementation detail of any one offline tool.
///
/// Duplicate words keep the cost of their first occurrence; later
/// duplicates are dropped before table placement (an open-addressed table
/// has no way to represent two costs for one key).
pub fn build(entries: &[(Vec<u8>, f32)], default_cost: f32, unknown_cost: f32) -> Vec<u8> {
    const MAX_LOAD_FACTOR: f64 = 0.75;

    let mut seen = std::collections::HashSet::with_capacity(entries.len());
    let mut unique: Vec<(&[u8], f32)> = Vec::with_capacity(entries.len());
    for (word, cost) in entries {
        if seen.insert(word.as_slice()) {
            unique.push((word.as_slice(), *cost));
        }
    }

    let num_entries = unique.len() as u32;
    let min_table_size = ((num_entries as f64 / MAX_LOAD_FACTOR).ceil() as u32).max(1);
    let table_size = min_table_size.next_power_of_two();
    let mask = table_size - 1;

    let mut table: Vec<(u32, f32)> = vec![(0, 0.0); table_size as usize];
    let mut pool: Vec<u8> = vec![0u8];
    let mut max_word_length: u32 = 0;

    for (word, cost) in &unique {
        let offset = pool.len() as u32;
        pool.extend_from_slice(word);
        pool.push(0);
        max_word_length = max_word_length.max(word.len() as u32);

        let hash = djb2(word);
        let mut idx = (hash & mask) as usize;
        while table[idx].0 != 0 {
            idx = (idx + 1) & (mask as usize);
        }
        table[idx] = (offset, *cost);
    }

    let mut out = Vec::with_capacity(HEADER_LEN + table.len() * SLOT_LEN + pool.len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&VERSION.to_le_bytes());
    out.extend_from_slice(&num_entries.to_le_bytes());
    out.extend_from_slice(&table_size.to_le_bytes());
    out.extend_from_slice(&default_cost.to_le_bytes());
    out.extend_from_slice(&unknown_cost.to_le_bytes());
    out.extend_from_slice(&max_word_length.to_le_bytes());
    out.extend_from_slice(&[0u8; 4]); // padding
    for (offset, cost) in &table {
        out.extend_from_slice(&offset.to_le_bytes());
        out.extend_from_slice(&cost.to_le_bytes());
    }
    out.extend_from_slice(&pool);
    out
}
