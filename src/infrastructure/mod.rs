//! Infrastructure layer - external adapters and integrations.
//!
//! This layer provides adapters for:
//! - Clock abstraction (system time vs mock)
//! - Storage implementations (sharded maps with eviction)
//! - The `tracing` sink and the device logger facade

pub mod clock;
pub mod eviction;
pub mod logger;
pub mod sink;
pub mod storage;

/// Test doubles for the clock and sink ports.
///
/// `MockClock` and `CaptureSink` are always available. `MockCaptureLayer`,
/// which needs `tracing-subscriber`, requires the `test-helpers` feature
/// outside of this crate's own tests:
/// ```toml
/// [dev-dependencies]
/// tunnel-log-throttle = { version = "*", features = ["test-helpers"] }
/// ```
pub mod mocks;
