//! # Bucketed (Sharded) Storage
//!
//! Fans a single `Storage` surface out over `N` independent backends,
//! routing each key deterministically by `crc32_ieee(key) mod N`.
//!
//! ## Design Principles
//!
//! 1. **No Cross-Shard Coordination**: each shard owns its own lock; a
//!    bucket-level operation touches exactly one shard (except `Keys`,
//!    which fans out and concatenates).
//! 2. **Immutable Topology**: the shard array is fixed at construction via
//!    a factory closure, so routing never needs to handle resizing.

use crc32fast::Hasher;
use hkv_common::{HashValue, HkvResult, Key, StringValue};

use crate::storage::Storage;

/// Fixed-size fan-out over `N` `Storage` backends.
pub struct BucketStorage {
    shards: Vec<Box<dyn Storage>>,
}

impl BucketStorage {
    /// Builds `n` shards, each produced by `factory(shard_index)`.
    pub fn new<F>(n: usize, factory: F) -> Self
    where
        F: Fn(usize) -> Box<dyn Storage>,
    {
        assert!(n > 0, "bucket storage requires at least one shard");
        let shards = (0..n).map(factory).collect();
        BucketStorage { shards }
    }

    /// Returns the shard index a key routes to.
    pub fn shard_index(&self, key: &Key) -> usize {
        let mut hasher = Hasher::new();
        hasher.update(key.as_bytes());
        (hasher.finalize() as usize) % self.shards.len()
    }

    fn shard_for(&self, key: &Key) -> &dyn Storage {
        self.shards[self.shard_index(key)].as_ref()
    }
}

impl Storage for BucketStorage {
    fn set(&self, key: Key, value: StringValue, ttl: u64) -> HkvResult<()> {
        self.shard_for(&key).set(key, value, ttl)
    }

    fn get(&self, key: &Key) -> HkvResult<StringValue> {
        self.shard_for(key).get(key)
    }

    fn hset(&self, key: Key, field: Key, value: StringValue) -> HkvResult<()> {
        self.shard_for(&key).hset(key, field, value)
    }

    fn hget(&self, key: &Key, field: &Key) -> HkvResult<StringValue> {
        self.shard_for(key).hget(key, field)
    }

    fn hgetall(&self, key: &Key) -> HkvResult<HashValue> {
        self.shard_for(key).hgetall(key)
    }

    fn delete(&self, key: &Key) {
        self.shard_for(key).delete(key)
    }

    fn keys(&self) -> Vec<Key> {
        self.shards.iter().flat_map(|s| s.keys()).collect()
    }

    fn expire(&self, key: &Key, ttl: u64) -> HkvResult<()> {
        self.shard_for(key).expire(key, ttl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::Memory;
    use std::time::Duration;

    fn key(s: &str) -> Key {
        Key::new(s.as_bytes().to_vec()).unwrap()
    }

    fn val(s: &str) -> StringValue {
        StringValue::new(s.as_bytes().to_vec())
    }

    fn bucket(n: usize) -> BucketStorage {
        BucketStorage::new(n, |_| Box::new(Memory::new(Duration::ZERO)))
    }

    #[test]
    fn routes_and_round_trips() {
        let store = bucket(4);
        for i in 0..20 {
            let k = key(&format!("key-{i}"));
            store.set(k.clone(), val("v"), 0).unwrap();
            assert!(store.get(&k).is_ok());
        }
    }

    #[test]
    fn keys_is_union_of_shards() {
        let store = bucket(4);
        let mut inserted: Vec<Key> = (0..20).map(|i| key(&format!("key-{i}"))).collect();
        for k in &inserted {
            store.set(k.clone(), val("v"), 0).unwrap();
        }
        let mut got = store.keys();
        inserted.sort_by(|a, b| a.as_bytes().cmp(b.as_bytes()));
        got.sort_by(|a, b| a.as_bytes().cmp(b.as_bytes()));
        assert_eq!(got, inserted);
    }

    #[test]
    fn same_key_always_same_shard() {
        let store = bucket(8);
        let idx1 = store.shard_index(&key("stable"));
        let idx2 = store.shard_index(&key("stable"));
        assert_eq!(idx1, idx2);
    }
}
