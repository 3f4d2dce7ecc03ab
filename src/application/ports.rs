//! Ports (interfaces) for the application layer.
//!
//! In hexagonal architecture, ports define the interfaces that the application
//! layer needs. Infrastructure adapters implement these ports, and the tunnel
//! device on the far side talks to the crate through [`DeviceLogger`].

use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::time::Instant;

/// Candidate entry for eviction consideration.
///
/// Recency is tracked by a monotonic access sequence rather than wall time, so
/// entries touched within the same clock tick still have a strict order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvictionCandidate<K> {
    /// The key of the entry
    pub key: K,
    /// Sequence number at which the entry was inserted
    pub created: u64,
    /// Sequence number of the most recent access
    pub last_access: u64,
}

/// Port for eviction policy decisions.
///
/// The policy only picks the victim. How many entries may be kept is decided
/// by the caller of [`Storage::evict_below`].
pub trait EvictionPolicy<K>: Send + Sync + Debug
where
    K: Clone,
{
    /// Select a victim from the given candidates for eviction.
    ///
    /// Returns `None` if no eviction should occur.
    fn select_victim(&self, candidates: &[EvictionCandidate<K>]) -> Option<K>;
}

/// Port for obtaining current time.
///
/// Infrastructure provides concrete implementations (SystemClock, MockClock).
pub trait Clock: Send + Sync + Debug {
    /// Get the current instant.
    fn now(&self) -> Instant;
}

/// Port for concurrent key-value storage.
///
/// Implementations must serialize mutable access to any single entry: the
/// accessor passed to [`Storage::with_entry_mut`] is the only writer of that
/// entry while it runs.
pub trait Storage<K, V>: Send + Sync + Debug
where
    K: Hash + Eq + Clone + Send + Sync,
    V: Send + Sync,
{
    /// Access an entry with mutable access, creating it if necessary.
    ///
    /// # Arguments
    /// * `key` - The key to look up
    /// * `factory` - Function to create a new value if the key doesn't exist
    /// * `accessor` - Function that gets mutable access to the value
    ///
    /// # Returns
    /// The result from the accessor function
    fn with_entry_mut<F, R>(&self, key: K, factory: impl FnOnce() -> V, accessor: F) -> R
    where
        F: FnOnce(&mut V) -> R;

    /// Check if a key is currently tracked.
    fn contains_key(&self, key: &K) -> bool;

    /// Remove entries picked by `policy` until fewer than `limit` remain.
    ///
    /// Returns the number of entries removed.
    fn evict_below(&self, limit: usize, policy: &dyn EvictionPolicy<K>) -> usize;

    /// Get the number of entries in the storage.
    fn len(&self) -> usize;

    /// Check if the storage is empty.
    fn is_empty(&self) -> bool;

    /// Clear all entries from the storage.
    fn clear(&self);
}

/// Port for the final log sink.
///
/// Receives a format string with `{}` placeholders and its arguments. Any
/// `Fn(&str, &[&dyn Display])` closure that is `Send + Sync` is a sink.
pub trait LogSink: Send + Sync {
    /// Emit one log line.
    fn log(&self, format: &str, args: &[&dyn Display]);
}

impl<F> LogSink for F
where
    F: Fn(&str, &[&dyn Display]) + Send + Sync,
{
    fn log(&self, format: &str, args: &[&dyn Display]) {
        self(format, args)
    }
}

/// Capability the tunnel device logs through.
///
/// The device holds one of these and calls it synchronously, possibly from
/// many threads at once, for every log line it produces.
pub trait DeviceLogger: Send + Sync {
    /// Informational (verbose) log line.
    fn verbose(&self, format: &str, args: &[&dyn Display]);

    /// Error log line.
    fn error(&self, format: &str, args: &[&dyn Display]);
}
