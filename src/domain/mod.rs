//! Domain layer - pure logic with no concurrency or I/O.
//!
//! This layer contains the core concepts of the log adapter:
//! - The tick-based token bucket
//! - Peer keys and their device/short identifier forms
//! - The immutable rewrite table
//! - Drop rules for device noise
//! - Log events, message formatting and format keys
//!
//! All types in this layer are pure and easily testable.

pub mod event;
pub mod filter;
pub mod peer;
pub mod rewrite;
pub mod token_bucket;
