//! Error taxonomy for `khmer-core` (spec §7).
//!
//! The only error surface the core exposes is dictionary construction:
//! everything downstream of a successfully loaded `Dictionary` is total
//! (spec §7 — `MalformedInput`/`EmptyInput`/`OutOfMemory` are explicitly
//! not errors, they are handled inline by fallback paths). Following the
//! teacher's lead of propagating one concrete error type per library
//! surface rather than reaching for a generic boxed error, this is a
//! small hand-written enum rather than a `thiserror` derive.

use std::fmt;

/// Why a candidate dictionary blob was rejected at load time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DictionaryError {
    /// The blob is shorter than the fixed 32-byte header.
    Truncated { len: usize },
    /// The first 4 bytes are not `b"KDIC"`.
    BadMagic { found: [u8; 4] },
    /// The version field is not the one this build understands.
    UnsupportedVersion { found: u32 },
    /// `table_size` is zero or not a power of two.
    BadTableSize { table_size: u32 },
    /// The table/string-pool region runs past the end of the blob.
    OutOfBounds { needed: usize, available: usize },
    /// A table slot's `name_offset` points outside the string pool, or the
    /// pool is not NUL-terminated at the expected position.
    BadStringOffset { offset: u32, pool_len: usize },
}

impl fmt::Display for DictionaryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DictionaryError::Truncated { len } => {
                write!(f, "dictionary blob is truncated: {len} bytes, need at least 32")
            }
            DictionaryError::BadMagic { found } => {
                write!(f, "bad magic bytes: {found:02x?}, expected 4b 44 49 43 (\"KDIC\")")
            }
            DictionaryError::UnsupportedVersion { found } => {
                write!(f, "unsupported dictionary version {found}, expected 1")
            }
            DictionaryError::BadTableSize { table_size } => {
                write!(f, "table_size {table_size} is not a positive power of two")
            }
            DictionaryError::OutOfBounds { needed, available } => {
                write!(
                    f,
                    "dictionary blob too short for its own header: needs {needed} bytes, has {available}"
                )
            }
            DictionaryError::BadStringOffset { offset, pool_len } => {
                write!(
                    f,
                    "table entry points at string_pool offset {offset}, but pool is only {pool_len} bytes"
                )
            }
        }
    }
}

impl std::error::Error for DictionaryError {}
