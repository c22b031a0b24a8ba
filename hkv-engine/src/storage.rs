//! # Storage Contract
//!
//! ## Design Principles
//!
//! 1. **Strategy Pattern**: Abstract the keyspace behind a trait so `Memory`,
//!    `LRUStorage`, and `BucketStorage` can be swapped without touching the
//!    command dispatcher.
//! 2. **Binary-Safe API**: Keys, fields, and values are byte buffers wrapped
//!    in the validated newtypes from `hkv_common`.
//! 3. **Explicit TTL**: Expiration is absolute epoch seconds, carried in the
//!    `Entry` rather than recomputed by callers.
//! 4. **One Shape Per Key**: reading a string through the hash path (or vice
//!    versa) is a `WrongType` error, never a silent coercion.

use hkv_common::{HashValue, HkvResult, Key, StringValue};

/// The contract shared by every keyspace backend.
///
/// Operations are linearizable per key; ordering between unrelated keys is
/// not observable. All methods take `&self`: backends own their interior
/// mutability so callers can hold one shared reference across connections.
pub trait Storage: Send + Sync {
    /// Inserts or replaces the string at `key`, with `ttl` seconds (`0` =
    /// never expires). Replaces any existing entry, including a hash,
    /// unless the backend documents a stricter rule (see `Memory`).
    fn set(&self, key: Key, value: StringValue, ttl: u64) -> HkvResult<()>;

    /// Returns the string stored at `key`.
    ///
    /// `NotFound` if absent or expired; `WrongType` if `key` holds a hash.
    fn get(&self, key: &Key) -> HkvResult<StringValue>;

    /// Sets one field of the hash at `key`, creating an empty hash first if
    /// `key` is absent or expired. `WrongType` if `key` holds a string.
    fn hset(&self, key: Key, field: Key, value: StringValue) -> HkvResult<()>;

    /// Returns one field of the hash at `key`.
    ///
    /// `NotFound` if the key or field is absent; `WrongType` if `key` holds
    /// a string.
    fn hget(&self, key: &Key, field: &Key) -> HkvResult<StringValue>;

    /// Returns a snapshot of every field in the hash at `key`. The returned
    /// map is not aliased to internal state.
    fn hgetall(&self, key: &Key) -> HkvResult<HashValue>;

    /// Removes `key`. Idempotent: always succeeds, whether or not `key` was
    /// present.
    fn delete(&self, key: &Key);

    /// Returns a snapshot of keys whose entry is not expired. Order is
    /// undefined.
    fn keys(&self) -> Vec<Key>;

    /// Updates the TTL of an existing, non-expired entry.
    ///
    /// `NotFound` if `key` is absent or already expired.
    fn expire(&self, key: &Key, ttl: u64) -> HkvResult<()>;
}
