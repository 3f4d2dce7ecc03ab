//! Registry of per-format-key token buckets.
//!
//! The registry owns one bucket per distinct format key. Buckets are created
//! lazily, full, the first time their key is seen. At most `max_keys`
//! buckets are kept: before a new key is admitted, the eviction policy picks
//! buckets to give up.

use crate::application::config::ThrottleConfig;
use crate::application::ports::{Clock, EvictionPolicy, Storage};
use crate::domain::{event::FormatKey, token_bucket::TokenBucket};
use std::sync::Arc;
use std::time::Instant;

/// Registry managing all bucket state.
///
/// This type is generic over the storage implementation. In production, use
/// `Arc<ShardedStorage>`, whose entry guards provide the single-writer access
/// each bucket requires.
#[derive(Clone)]
pub struct BucketRegistry<S>
where
    S: Storage<FormatKey, TokenBucket> + Clone,
{
    storage: S,
    clock: Arc<dyn Clock>,
    config: ThrottleConfig,
    eviction: Arc<dyn EvictionPolicy<FormatKey>>,
}

impl<S> BucketRegistry<S>
where
    S: Storage<FormatKey, TokenBucket> + Clone,
{
    /// Create a new registry.
    ///
    /// `config` sets the shape of every bucket and the number of keys kept;
    /// `eviction` picks which key to drop when a new one arrives at the bound.
    pub fn new(
        storage: S,
        clock: Arc<dyn Clock>,
        config: ThrottleConfig,
        eviction: Arc<dyn EvictionPolicy<FormatKey>>,
    ) -> Self {
        Self {
            storage,
            clock,
            config,
            eviction,
        }
    }

    /// Access or create the bucket for `key` with a callback.
    ///
    /// The callback receives the bucket and the current timestamp, and runs
    /// while the storage holds exclusive access to that bucket.
    pub fn with_bucket<F, R>(&self, key: FormatKey, f: F) -> R
    where
        F: FnOnce(&mut TokenBucket, Instant) -> R,
    {
        let now = self.clock.now();
        let config = self.config;

        if !self.storage.contains_key(&key) {
            self.storage.evict_below(config.max_keys(), self.eviction.as_ref());
        }

        self.storage.with_entry_mut(
            key,
            || TokenBucket::new(config.interval(), config.burst(), now),
            |bucket| f(bucket, now),
        )
    }

    /// Get the bucket configuration.
    pub fn config(&self) -> &ThrottleConfig {
        &self.config
    }

    /// Check if a bucket exists for `key`.
    pub fn contains(&self, key: &FormatKey) -> bool {
        self.storage.contains_key(key)
    }

    /// Get the number of tracked format keys.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Drop every bucket.
    pub fn clear(&self) {
        self.storage.clear();
    }
}
