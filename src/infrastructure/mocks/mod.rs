//! Mock implementations for testing.
//!
//! This module provides test doubles for infrastructure adapters,
//! enabling controlled testing of the pipeline.

pub mod clock;
#[cfg(any(test, feature = "test-helpers"))]
pub mod layer;
pub mod sink;

pub use clock::MockClock;
#[cfg(any(test, feature = "test-helpers"))]
pub use layer::MockCaptureLayer;
pub use sink::{CaptureSink, CapturedLine};
