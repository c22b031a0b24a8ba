//! # Bounded LRU-Evicting Storage Backend
//!
//! Wraps [`LruContainer`] behind a single exclusive mutex and layers the
//! `Storage` contract's type-checking and expiry-as-absence rules on top of
//! the container's raw, expiry-agnostic operations.
//!
//! ## Design Principles
//!
//! 1. **One Lock, Whole Backend**: every operation (reads included) takes
//!    the mutex, since the LRU bookkeeping mutates list links on access.
//! 2. **Capacity Enforced on Insert**: only a brand-new key can push the
//!    container over capacity; replacing an existing key never evicts.
//! 3. **In-Place Hash Mutation**: `HSet` on an existing hash does not touch
//!    its TTL — only `Set`, a fresh `HSet`-created hash, or `Expire` do.

use hkv_common::{clock::now_secs, ttl_to_expires_at, EntryValue, HashValue, HkvError, HkvResult, Key, StringValue};
use parking_lot::Mutex;

use crate::lru::{LruContainer, LruLookup};
use crate::storage::Storage;

/// LRU-bounded backend: capacity-limited, evicts least-recently-used keys.
pub struct LRUStorage {
    inner: Mutex<LruContainer>,
}

impl LRUStorage {
    /// Builds a backend bounded to `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        LRUStorage {
            inner: Mutex::new(LruContainer::new(capacity)),
        }
    }
}

impl Storage for LRUStorage {
    fn set(&self, key: Key, value: StringValue, ttl: u64) -> HkvResult<()> {
        let now = now_secs();
        let expires_at = ttl_to_expires_at(now, ttl);
        let mut lru = self.inner.lock();
        lru.set(key, EntryValue::String(value), expires_at);
        Ok(())
    }

    fn get(&self, key: &Key) -> HkvResult<StringValue> {
        let now = now_secs();
        let mut lru = self.inner.lock();
        match lru.get(key, now) {
            LruLookup::Live(EntryValue::String(v)) => Ok(v.clone()),
            LruLookup::Live(EntryValue::Hash(_)) => Err(HkvError::WrongType),
            LruLookup::Expired | LruLookup::Missing => Err(HkvError::NotFound),
        }
    }

    fn hset(&self, key: Key, field: Key, value: StringValue) -> HkvResult<()> {
        let now = now_secs();
        let mut lru = self.inner.lock();
        match lru.get(&key, now) {
            LruLookup::Live(EntryValue::String(_)) => Err(HkvError::WrongType),
            LruLookup::Live(EntryValue::Hash(_)) => {
                let (value_ref, _) = lru.get_mut(&key).expect("present per lookup above");
                if let EntryValue::Hash(map) = value_ref {
                    map.insert(field, value);
                }
                Ok(())
            }
            LruLookup::Expired | LruLookup::Missing => {
                let mut map = HashValue::new();
                map.insert(field, value);
                lru.set(key, EntryValue::Hash(map), 0);
                Ok(())
            }
        }
    }

    fn hget(&self, key: &Key, field: &Key) -> HkvResult<StringValue> {
        let now = now_secs();
        let mut lru = self.inner.lock();
        match lru.get(key, now) {
            LruLookup::Live(EntryValue::Hash(map)) => {
                map.get(field).cloned().ok_or(HkvError::NotFound)
            }
            LruLookup::Live(EntryValue::String(_)) => Err(HkvError::WrongType),
            LruLookup::Expired | LruLookup::Missing => Err(HkvError::NotFound),
        }
    }

    fn hgetall(&self, key: &Key) -> HkvResult<HashValue> {
        let now = now_secs();
        let mut lru = self.inner.lock();
        match lru.get(key, now) {
            LruLookup::Live(EntryValue::Hash(map)) => Ok(map.clone()),
            LruLookup::Live(EntryValue::String(_)) => Err(HkvError::WrongType),
            LruLookup::Expired | LruLookup::Missing => Err(HkvError::NotFound),
        }
    }

    fn delete(&self, key: &Key) {
        self.inner.lock().delete(key);
    }

    fn keys(&self) -> Vec<Key> {
        let now = now_secs();
        self.inner.lock().keys(now)
    }

    fn expire(&self, key: &Key, ttl: u64) -> HkvResult<()> {
        let now = now_secs();
        let mut lru = self.inner.lock();
        match lru.get(key, now) {
            LruLookup::Missing | LruLookup::Expired => Err(HkvError::NotFound),
            LruLookup::Live(_) => {
                lru.expire(key, ttl_to_expires_at(now, ttl));
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> Key {
        Key::new(s.as_bytes().to_vec()).unwrap()
    }

    fn val(s: &str) -> StringValue {
        StringValue::new(s.as_bytes().to_vec())
    }

    #[test]
    fn set_get_roundtrip() {
        let store = LRUStorage::new(4);
        store.set(key("a"), val("1"), 0).unwrap();
        assert_eq!(store.get(&key("a")).unwrap().as_bytes(), b"1");
    }

    #[test]
    fn capacity_evicts_oldest() {
        let store = LRUStorage::new(2);
        store.set(key("a"), val("1"), 0).unwrap();
        store.set(key("b"), val("2"), 0).unwrap();
        store.set(key("c"), val("3"), 0).unwrap();
        assert!(matches!(store.get(&key("a")), Err(HkvError::NotFound)));
        assert!(store.get(&key("b")).is_ok());
        assert!(store.get(&key("c")).is_ok());
    }

    #[test]
    fn hset_creates_hash_and_round_trips() {
        let store = LRUStorage::new(4);
        store.hset(key("h"), key("f"), val("v")).unwrap();
        assert_eq!(store.hget(&key("h"), &key("f")).unwrap().as_bytes(), b"v");
        let all = store.hgetall(&key("h")).unwrap();
        assert_eq!(all.get(&key("f")).unwrap().as_bytes(), b"v");
    }

    #[test]
    fn hset_on_string_is_wrong_type() {
        let store = LRUStorage::new(4);
        store.set(key("a"), val("1"), 0).unwrap();
        assert!(matches!(store.hset(key("a"), key("f"), val("v")), Err(HkvError::WrongType)));
    }

    #[test]
    fn get_on_hash_is_wrong_type() {
        let store = LRUStorage::new(4);
        store.hset(key("h"), key("f"), val("v")).unwrap();
        assert!(matches!(store.get(&key("h")), Err(HkvError::WrongType)));
    }

    #[test]
    fn hset_does_not_disturb_existing_ttl() {
        let store = LRUStorage::new(4);
        store.hset(key("h"), key("f1"), val("v1")).unwrap();
        store.expire(&key("h"), 1000).unwrap();
        store.hset(key("h"), key("f2"), val("v2")).unwrap();
        // still has a TTL; a subsequent Expire on the same key should still
        // succeed (i.e. the key was never treated as missing by the second HSet)
        store.expire(&key("h"), 500).unwrap();
        assert_eq!(store.hget(&key("h"), &key("f1")).unwrap().as_bytes(), b"v1");
        assert_eq!(store.hget(&key("h"), &key("f2")).unwrap().as_bytes(), b"v2");
    }

    #[test]
    fn delete_is_idempotent() {
        let store = LRUStorage::new(4);
        store.set(key("a"), val("1"), 0).unwrap();
        store.delete(&key("a"));
        store.delete(&key("a"));
        assert!(matches!(store.get(&key("a")), Err(HkvError::NotFound)));
    }

    #[test]
    fn expire_missing_key_is_not_found() {
        let store = LRUStorage::new(4);
        assert!(matches!(store.expire(&key("a"), 10), Err(HkvError::NotFound)));
    }
}
