//! Storage implementations for bucket state.
//!
//! Provides concurrent, sharded storage whose entries an eviction policy can
//! trim on request.

use crate::application::ports::{EvictionCandidate, EvictionPolicy, Storage};
use ahash::RandomState;
use dashmap::DashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::trace;

#[derive(Debug)]
struct Slot<V> {
    value: V,
    created: u64,
    last_access: u64,
}

/// Thread-safe sharded storage backed by DashMap.
///
/// Each entry is guarded by its shard's lock while an accessor runs, which
/// gives every value a single writer at a time. Entries record when they were
/// inserted and last touched, using a storage-wide access sequence, so an
/// eviction policy can pick a victim when the caller needs room.
///
/// Eviction never runs while an entry guard is held. Concurrent inserts of
/// distinct new keys can therefore overshoot a bound by the number of racing
/// inserters until the next eviction.
#[derive(Debug)]
pub struct ShardedStorage<K, V>
where
    K: Eq + Hash + Clone,
{
    map: DashMap<K, Slot<V>, RandomState>,
    sequence: AtomicU64,
}

impl<K, V> ShardedStorage<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Create a new, empty sharded storage instance.
    pub fn new() -> Self {
        Self {
            map: DashMap::with_hasher(RandomState::new()),
            sequence: AtomicU64::new(0),
        }
    }

    fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::Relaxed)
    }
}

impl<K, V> Default for ShardedStorage<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

// Implement the Storage port
impl<K, V> Storage<K, V> for ShardedStorage<K, V>
where
    K: Hash + Eq + Clone + Send + Sync + std::fmt::Debug,
    V: Send + Sync + std::fmt::Debug,
{
    fn with_entry_mut<F, R>(&self, key: K, factory: impl FnOnce() -> V, accessor: F) -> R
    where
        F: FnOnce(&mut V) -> R,
    {
        let seq = self.next_sequence();

        if let Some(mut slot) = self.map.get_mut(&key) {
            slot.last_access = seq;
            return accessor(&mut slot.value);
        }

        let mut slot = self.map.entry(key).or_insert_with(|| Slot {
            value: factory(),
            created: seq,
            last_access: seq,
        });
        slot.last_access = seq;
        accessor(&mut slot.value)
    }

    fn contains_key(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    fn evict_below(&self, limit: usize, policy: &dyn EvictionPolicy<K>) -> usize {
        let mut evicted = 0;

        while self.map.len() >= limit {
            let candidates: Vec<EvictionCandidate<K>> = self
                .map
                .iter()
                .map(|entry| EvictionCandidate {
                    key: entry.key().clone(),
                    created: entry.created,
                    last_access: entry.last_access,
                })
                .collect();

            let Some(victim) = policy.select_victim(&candidates) else {
                break;
            };

            if self.map.remove(&victim).is_some() {
                trace!(key = ?victim, "evicted rate limit bucket");
                evicted += 1;
            }
        }

        evicted
    }

    fn len(&self) -> usize {
        self.map.len()
    }

    fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    fn clear(&self) {
        self.map.clear()
    }
}

// Implement Storage for Arc<ShardedStorage> to allow it to be used directly
impl<K, V> Storage<K, V> for Arc<ShardedStorage<K, V>>
where
    K: Hash + Eq + Clone + Send + Sync + std::fmt::Debug,
    V: Send + Sync + std::fmt::Debug,
{
    fn with_entry_mut<F, R>(&self, key: K, factory: impl FnOnce() -> V, accessor: F) -> R
    where
        F: FnOnce(&mut V) -> R,
    {
        (**self).with_entry_mut(key, factory, accessor)
    }

    fn contains_key(&self, key: &K) -> bool {
        (**self).contains_key(key)
    }

    fn evict_below(&self, limit: usize, policy: &dyn EvictionPolicy<K>) -> usize {
        (**self).evict_below(limit, policy)
    }

    fn len(&self) -> usize {
        (**self).len()
    }

    fn is_empty(&self) -> bool {
        (**self).is_empty()
    }

    fn clear(&self) {
        (**self).clear()
    }
}
