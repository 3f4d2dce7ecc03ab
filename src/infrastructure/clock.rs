//! Clock adapters for time operations.
//!
//! Buckets only ever compare instants from the same clock, so the monotonic
//! `Instant` is all production needs. See `MockClock` (in
//! `crate::infrastructure::mocks`) for a clock tests can move by hand.

use crate::application::ports::Clock;
use std::time::Instant;

/// System clock implementation using `Instant::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Create a new system clock.
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}
