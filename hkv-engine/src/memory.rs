//! # Unbounded In-Memory Backend
//!
//! A single hashed map guarded by one reader/writer lock, with an optional
//! background task that periodically sweeps expired entries.
//!
//! ## Design Principles
//!
//! 1. **Single Lock, Whole Map**: writers take the exclusive half; readers
//!    (including `Keys`) take the shared half.
//! 2. **Stricter Set Rule**: unlike `LRUStorage`, `Set` refuses to replace a
//!    Hash with a String — it returns `WrongType` instead of promoting it.
//! 3. **Sweeper Tied to Instance Lifetime**: the background task holds a
//!    stop signal; `shutdown` sends it and joins before returning, so no
//!    exit path leaks the task.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use hkv_common::{clock::now_secs, ttl_to_expires_at, Entry, EntryValue, HashValue, HkvError, HkvResult, Key, StringValue};
use parking_lot::RwLock;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::storage::Storage;

struct Sweeper {
    stop_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

/// Unbounded backend: a plain hashed map plus a periodic expiry sweep.
pub struct Memory {
    map: Arc<RwLock<HashMap<Key, Entry>>>,
    sweeper: parking_lot::Mutex<Option<Sweeper>>,
}

impl Memory {
    /// Builds a backend whose background sweep runs every `cleanup_period`.
    /// A zero period disables sweeping; expiry is still enforced on read.
    pub fn new(cleanup_period: Duration) -> Self {
        let map: Arc<RwLock<HashMap<Key, Entry>>> = Arc::new(RwLock::new(HashMap::new()));
        let sweeper = if cleanup_period.is_zero() {
            None
        } else {
            let (stop_tx, mut stop_rx) = oneshot::channel();
            let sweep_map = Arc::clone(&map);
            let task = tokio::spawn(async move {
                let mut ticker = tokio::time::interval(cleanup_period);
                ticker.tick().await; // first tick fires immediately; skip it
                loop {
                    tokio::select! {
                        _ = ticker.tick() => {
                            let now = now_secs();
                            let mut guard = sweep_map.write();
                            let before = guard.len();
                            guard.retain(|_, entry| !entry.is_expired(now));
                            let removed = before - guard.len();
                            if removed > 0 {
                                debug!(removed, "swept expired entries");
                            }
                        }
                        _ = &mut stop_rx => break,
                    }
                }
            });
            Some(Sweeper { stop_tx, task })
        };

        Memory {
            map,
            sweeper: parking_lot::Mutex::new(sweeper),
        }
    }

    /// Signals the sweeper to stop and waits for it to exit. A no-op when
    /// sweeping was disabled. Safe to call more than once.
    pub async fn shutdown(&self) {
        let sweeper = self.sweeper.lock().take();
        if let Some(sweeper) = sweeper {
            let _ = sweeper.stop_tx.send(());
            let _ = sweeper.task.await;
        }
    }
}

impl Storage for Memory {
    fn set(&self, key: Key, value: StringValue, ttl: u64) -> HkvResult<()> {
        let now = now_secs();
        let mut map = self.map.write();
        if let Some(entry) = map.get(&key) {
            if !entry.is_expired(now) && entry.value.is_hash() {
                return Err(HkvError::WrongType);
            }
        }
        map.insert(key, Entry::new_string(value, ttl_to_expires_at(now, ttl)));
        Ok(())
    }

    fn get(&self, key: &Key) -> HkvResult<StringValue> {
        let now = now_secs();
        let map = self.map.read();
        match map.get(key) {
            None => Err(HkvError::NotFound),
            Some(entry) if entry.is_expired(now) => Err(HkvError::NotFound),
            Some(entry) => match &entry.value {
                EntryValue::String(v) => Ok(v.clone()),
                EntryValue::Hash(_) => Err(HkvError::WrongType),
            },
        }
    }

    fn hset(&self, key: Key, field: Key, value: StringValue) -> HkvResult<()> {
        let now = now_secs();
        let mut map = self.map.write();
        match map.get_mut(&key) {
            Some(entry) if !entry.is_expired(now) => match &mut entry.value {
                EntryValue::Hash(h) => {
                    h.insert(field, value);
                    Ok(())
                }
                EntryValue::String(_) => Err(HkvError::WrongType),
            },
            _ => {
                let mut h = HashValue::new();
                h.insert(field, value);
                map.insert(key.clone(), Entry::new_hash(0));
                if let Some(entry) = map.get_mut(&key) {
                    entry.value = EntryValue::Hash(h);
                }
                Ok(())
            }
        }
    }

    fn hget(&self, key: &Key, field: &Key) -> HkvResult<StringValue> {
        let now = now_secs();
        let map = self.map.read();
        match map.get(key) {
            None => Err(HkvError::NotFound),
            Some(entry) if entry.is_expired(now) => Err(HkvError::NotFound),
            Some(entry) => match &entry.value {
                EntryValue::Hash(h) => h.get(field).cloned().ok_or(HkvError::NotFound),
                EntryValue::String(_) => Err(HkvError::WrongType),
            },
        }
    }

    fn hgetall(&self, key: &Key) -> HkvResult<HashValue> {
        let now = now_secs();
        let map = self.map.read();
        match map.get(key) {
            None => Err(HkvError::NotFound),
            Some(entry) if entry.is_expired(now) => Err(HkvError::NotFound),
            Some(entry) => match &entry.value {
                EntryValue::Hash(h) => Ok(h.clone()),
                EntryValue::String(_) => Err(HkvError::WrongType),
            },
        }
    }

    fn delete(&self, key: &Key) {
        self.map.write().remove(key);
    }

    fn keys(&self) -> Vec<Key> {
        let now = now_secs();
        self.map
            .read()
            .iter()
            .filter(|(_, entry)| !entry.is_expired(now))
            .map(|(k, _)| k.clone())
            .collect()
    }

    fn expire(&self, key: &Key, ttl: u64) -> HkvResult<()> {
        let now = now_secs();
        let mut map = self.map.write();
        match map.get_mut(key) {
            Some(entry) if !entry.is_expired(now) => {
                entry.expires_at = ttl_to_expires_at(now, ttl);
                Ok(())
            }
            _ => Err(HkvError::NotFound),
        }
    }
}
