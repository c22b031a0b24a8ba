//! # Key/Value Type Definitions
//!
//! Core data types for the HybridKV keyspace.
//!
//! ## Design Principles
//!
//! 1. **Validated Newtypes**: `Key`/`Field` reject empty buffers and
//!    embedded whitespace/CRLF at construction so every later comparison
//!    and hash is over already-valid data.
//! 2. **Binary-Safe Values**: `StringValue` carries arbitrary bytes,
//!    including CR/LF, since only the framing — not the payload — is
//!    line-oriented.
//! 3. **Tagged Entry**: `EntryValue` keeps the string/hash distinction
//!    explicit so reads across the wrong shape fail with `WrongType`
//!    instead of silently coercing.

use std::collections::HashMap;
use std::fmt;

use crate::error::{HkvError, HkvResult};

/// An opaque, non-empty key with no embedded ASCII whitespace or CR/LF.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Key(Vec<u8>);

/// Hash field names share a key's validation rules.
pub type Field = Key;

impl Key {
    /// Builds a `Key` from raw bytes, rejecting empty input and embedded
    /// whitespace or CR/LF.
    pub fn new(data: impl Into<Vec<u8>>) -> HkvResult<Self> {
        let data = data.into();
        if data.is_empty() {
            return Err(HkvError::BadFormat);
        }
        if data
            .iter()
            .any(|&b| b == b' ' || b == b'\t' || b == b'\r' || b == b'\n')
        {
            return Err(HkvError::BadFormat);
        }
        Ok(Key(data))
    }

    /// Returns the key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consumes the key, returning its owned bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({:?})", String::from_utf8_lossy(&self.0))
    }
}

/// An opaque byte string; may contain arbitrary bytes including CR/LF.
#[derive(Clone, PartialEq, Eq)]
pub struct StringValue(Vec<u8>);

impl StringValue {
    /// Wraps raw bytes with no further validation.
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        StringValue(data.into())
    }

    /// Returns the value bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the value length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when the value has zero length.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes the value, returning its owned bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl fmt::Debug for StringValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.len() <= 32 {
            write!(f, "StringValue({:?})", String::from_utf8_lossy(&self.0))
        } else {
            write!(f, "StringValue({}B)", self.0.len())
        }
    }
}

/// A keyed mapping from field to byte string, stored under one outer key.
pub type HashValue = HashMap<Field, StringValue>;

/// The value shape held by an `Entry`: a plain string or a field map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryValue {
    String(StringValue),
    Hash(HashValue),
}

impl EntryValue {
    /// Returns true when this entry is the string shape.
    pub fn is_string(&self) -> bool {
        matches!(self, EntryValue::String(_))
    }

    /// Returns true when this entry is the hash shape.
    pub fn is_hash(&self) -> bool {
        matches!(self, EntryValue::Hash(_))
    }
}

/// A stored entry: a polymorphic value plus an absolute expiration.
///
/// `expires_at == 0` means the entry never expires (invariant 3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub value: EntryValue,
    pub expires_at: u64,
}

impl Entry {
    /// Builds a new string entry with the given absolute expiration.
    pub fn new_string(value: StringValue, expires_at: u64) -> Self {
        Entry {
            value: EntryValue::String(value),
            expires_at,
        }
    }

    /// Builds a new, empty hash entry with the given absolute expiration.
    pub fn new_hash(expires_at: u64) -> Self {
        Entry {
            value: EntryValue::Hash(HashMap::new()),
            expires_at,
        }
    }

    /// Returns true if `now` (epoch seconds) is at or past expiration.
    ///
    /// An immortal entry (`expires_at == 0`) is never expired.
    pub fn is_expired(&self, now: u64) -> bool {
        self.expires_at != 0 && now >= self.expires_at
    }
}

/// Maps a TTL argument (seconds, spec invariant 4) to an absolute
/// expiration timestamp: `ttl > 0` becomes `now + ttl`, else `0` (immortal).
pub fn ttl_to_expires_at(now: u64, ttl: u64) -> u64 {
    if ttl > 0 {
        now.saturating_add(ttl)
    } else {
        0
    }
}
