//! Eviction policy adapters for bounding the number of tracked format keys.
//!
//! These adapters implement the [`EvictionPolicy`](crate::application::ports::EvictionPolicy)
//! port. The bound itself comes from the registry's `max_keys`; the policies
//! differ only in which entry they give up.

pub mod fifo;
pub mod lru;

pub use fifo::FifoEviction;
pub use lru::LruEviction;
