// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process store for tests and local development.

use super::{KvStore, StoreError};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::{DashMap, DashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// `DashMap`-backed store. Per-key operations hold the shard lock, so
/// `incr_by` and `sadd` are atomic just like a networked store's.
#[derive(Clone, Default)]
pub struct MemoryStore {
    values: Arc<DashMap<String, String>>,
    sets: Arc<DashMap<String, DashSet<String>>>,
    native_incr_disabled: Arc<AtomicBool>,
    incr_calls: Arc<AtomicUsize>,
    offline: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose `incr_by` reports `Unsupported`, forcing callers onto
    /// their read-then-write fallback.
    pub fn without_native_incr() -> Self {
        let store = Self::default();
        store.native_incr_disabled.store(true, Ordering::SeqCst);
        store
    }

    /// Make every subsequent operation fail with `Unavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of successful native `incr_by` calls served.
    pub fn native_incr_calls(&self) -> usize {
        self.incr_calls.load(Ordering::SeqCst)
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "memory store is offline".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.check_online()?;
        Ok(self.values.get(key).map(|v| v.value().clone()))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.check_online()?;
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn incr_by(&self, key: &str, delta: i64) -> Result<i64, StoreError> {
        self.check_online()?;
        if self.native_incr_disabled.load(Ordering::SeqCst) {
            return Err(StoreError::Unsupported("incr_by"));
        }

        let corrupt = |raw: &str| StoreError::Corrupt {
            key: key.to_string(),
            reason: format!("value '{}' is not an integer", raw),
        };

        let total = match self.values.entry(key.to_string()) {
            Entry::Occupied(mut entry) => {
                let current: i64 = entry
                    .get()
                    .trim()
                    .parse()
                    .map_err(|_| corrupt(entry.get()))?;
                let next = current.checked_add(delta).ok_or_else(|| StoreError::Corrupt {
                    key: key.to_string(),
                    reason: "increment overflows".to_string(),
                })?;
                entry.insert(next.to_string());
                next
            }
            Entry::Vacant(entry) => {
                entry.insert(delta.to_string());
                delta
            }
        };

        self.incr_calls.fetch_add(1, Ordering::SeqCst);
        Ok(total)
    }

    async fn sadd(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        self.check_online()?;
        let set = self.sets.entry(key.to_string()).or_default();
        Ok(set.insert(member.to_string()))
    }

    async fn smembers(&self, key: &str) -> Result<Vec<String>, StoreError> {
        self.check_online()?;
        Ok(self
            .sets
            .get(key)
            .map(|set| set.iter().map(|m| m.key().clone()).collect())
            .unwrap_or_default())
    }
}
