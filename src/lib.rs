//! # tunnel-log-throttle
//!
//! Log adapter for a userspace WireGuard-style tunnel device.
//!
//! The device produces a steady stream of printf-like log lines, many of them
//! routine and many repeated in tight loops. This crate sits between the
//! device and the host's logger and runs every line through three stages:
//!
//! 1. **Filter**: known-benign noise is dropped outright.
//! 2. **Rewrite**: the device's abbreviated peer identifiers are replaced by
//!    the short identifiers the host's UI uses.
//! 3. **Throttle**: each format string gets its own token bucket, so a single
//!    noisy line cannot flood the output.
//!
//! Survivors reach the sink with `<RATELIMITED>` prepended to their format.
//! Dropped and suppressed lines leave no trace.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tunnel_log_throttle::{DeviceLogger, Peer, PublicKey, TunnelLogger};
//! use std::time::Duration;
//!
//! // Defaults: one line per 5 seconds per format, bursts of 5, 100 formats tracked
//! let logger = TunnelLogger::new();
//!
//! // Or customize:
//! let logger = TunnelLogger::builder()
//!     .with_interval(Duration::from_secs(1))
//!     .with_burst(10)
//!     .with_max_keys(500)
//!     .build()
//!     .unwrap();
//!
//! // Tell the logger which peers are configured
//! let key = PublicKey::from_base64("AAECAwQFBgcICQoLDA0ODxAREhMUFRYXGBkaGxwdHh8=").unwrap();
//! logger.set_peers(&[Peer::new(key)]);
//!
//! // Hand the logger to the device; it calls these from any thread
//! logger.error("{} - Handshake did not complete", &[&key.wire_identifier()]);
//! ```
//!
//! ## Token Buckets
//!
//! A [`TokenBucket`] refills in whole ticks. The partial tick is carried
//! forward, so the long-run rate is exact even when checks arrive at odd times:
//!
//! ```rust
//! use tunnel_log_throttle::TokenBucket;
//! use std::time::{Duration, Instant};
//!
//! let start = Instant::now();
//! let mut bucket = TokenBucket::new(Duration::from_secs(1), 2, start);
//!
//! assert!(bucket.get());
//! assert!(bucket.get());
//! assert!(!bucket.get());
//!
//! bucket.advance_to(start + Duration::from_millis(1500));
//! assert!(bucket.get());
//! assert!(!bucket.get());
//!
//! // The half tick left over above completes here
//! bucket.advance_to(start + Duration::from_secs(2));
//! assert!(bucket.get());
//! ```
//!
//! ## Peer Rewriting
//!
//! The device abbreviates a peer key as `peer(XXXX…YYYY)`. Publishing a peer
//! set builds a [`RewriteTable`] that maps each of those to `[XXXXX]`.
//! Updates swap the whole table atomically, so readers never see a mix of
//! two peer sets:
//!
//! ```rust
//! use tunnel_log_throttle::{Peer, PublicKey, RewriteTable};
//!
//! let key = PublicKey::new([0u8; 32]);
//! let table = RewriteTable::from_peers(&[Peer::new(key)]);
//!
//! assert_eq!(
//!     table.rewrite("peer(AAAA…AAAA) - Received handshake response"),
//!     "[AAAAA] - Received handshake response"
//! );
//! ```
//!
//! Every rewritten line is throttled under one shared format key, since its
//! text no longer matches any format string the device uses.
//!
//! ## Sinks
//!
//! Surviving lines go to a [`LogSink`]. The default [`TracingSink`] emits a
//! `tracing` event with target `tunnel_device`. Any closure works too:
//!
//! ```rust
//! use tunnel_log_throttle::{format_message, DeviceLogger, TunnelLogger};
//! use std::fmt::Display;
//!
//! let logger = TunnelLogger::builder()
//!     .with_sink(|format: &str, args: &[&dyn Display]| {
//!         eprintln!("{}", format_message(format, args));
//!     })
//!     .build()
//!     .unwrap();
//!
//! logger.verbose("Received {} bytes", &[&1420]);
//! ```
//!
//! ## Memory Management
//!
//! One bucket is kept per distinct format string, bounded by `max_keys`.
//! When a new format arrives at the bound, the least recently used bucket is
//! evicted (see [`EvictionStrategy`] for FIFO). An evicted format starts over
//! with a full bucket the next time it is seen.

// Domain layer - pure logic
pub mod domain;

// Application layer - orchestration
pub mod application;

// Infrastructure layer - external adapters
pub mod infrastructure;

// Re-export commonly used types for convenience
pub use domain::{
    event::{format_message, FormatKey, LogEvent},
    filter::{drop_rule_for, should_drop, DropRule},
    peer::{wire_identifier, KeyError, Peer, PublicKey},
    rewrite::RewriteTable,
    token_bucket::TokenBucket,
};

pub use application::{
    config::{ThrottleConfig, ThrottleConfigError},
    limiter::{LimitDecision, RateLimiter},
    pipeline::{Outcome, Pipeline, Severity, RATE_LIMITED_MARKER, VERBOSE_PREFIX},
    ports::{Clock, DeviceLogger, EvictionCandidate, EvictionPolicy, LogSink, Storage},
    publisher::RewritePublisher,
    registry::BucketRegistry,
};

pub use infrastructure::{
    clock::SystemClock,
    eviction::{FifoEviction, LruEviction},
    logger::{BuildError, EvictionStrategy, TunnelLogger, TunnelLoggerBuilder},
    sink::{TracingSink, DEVICE_TARGET},
    storage::ShardedStorage,
};
