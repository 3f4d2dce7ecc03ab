//! Oldest-first eviction adapter.

use crate::application::ports::{EvictionCandidate, EvictionPolicy};

/// Evicts the entry that was inserted first, regardless of later use.
#[derive(Debug, Clone, Copy, Default)]
pub struct FifoEviction;

impl FifoEviction {
    /// Create a FIFO eviction policy.
    pub fn new() -> Self {
        Self
    }
}

impl<K> EvictionPolicy<K> for FifoEviction
where
    K: Clone,
{
    fn select_victim(&self, candidates: &[EvictionCandidate<K>]) -> Option<K> {
        candidates
            .iter()
            .min_by_key(|candidate| candidate.created)
            .map(|candidate| candidate.key.clone())
    }
}
