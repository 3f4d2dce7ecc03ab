//! LRU (Least Recently Used) eviction adapter.

use crate::application::ports::{EvictionCandidate, EvictionPolicy};

/// LRU eviction policy.
///
/// Picks the least recently accessed entry. This is the default: a format
/// key that keeps logging keeps its bucket, and with it any exhausted
/// allowance.
#[derive(Debug, Clone, Copy, Default)]
pub struct LruEviction;

impl LruEviction {
    /// Create a new LRU eviction policy.
    pub fn new() -> Self {
        Self
    }
}

impl<K> EvictionPolicy<K> for LruEviction
where
    K: Clone,
{
    fn select_victim(&self, candidates: &[EvictionCandidate<K>]) -> Option<K> {
        candidates
            .iter()
            .min_by_key(|candidate| candidate.last_access)
            .map(|candidate| candidate.key.clone())
    }
}
