//! Discrete, tick-based token bucket.
//!
//! The bucket admits up to `max` events in a burst and is replenished one token
//! per whole `tick` of elapsed time. Refill only ever consumes whole ticks: the
//! fractional remainder of an interval stays on the clock and is credited by a
//! later call, so irregular polling never loses time to rounding.

use std::time::{Duration, Instant};

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// A token bucket refilled in whole ticks.
///
/// The bucket is not internally synchronized. All mutating methods take
/// `&mut self`; whoever owns the bucket must serialize access to it.
///
/// # Example
/// ```
/// use tunnel_log_throttle::TokenBucket;
/// use std::time::{Duration, Instant};
///
/// let start = Instant::now();
/// let mut bucket = TokenBucket::new(Duration::from_secs(1), 2, start);
///
/// assert!(bucket.get());
/// assert!(bucket.get());
/// assert!(!bucket.get());
///
/// bucket.advance_to(start + Duration::from_secs(1));
/// assert!(bucket.get());
/// assert!(!bucket.get());
/// ```
#[derive(Debug, Clone)]
pub struct TokenBucket {
    remaining: usize,
    max: usize,
    tick: Duration,
    last_refill: Instant,
}

impl TokenBucket {
    /// Create a full bucket.
    ///
    /// # Arguments
    /// * `tick` - Interval that earns one token
    /// * `max` - Capacity, the largest burst the bucket admits
    /// * `now` - Reference instant for the first refill
    pub fn new(tick: Duration, max: usize, now: Instant) -> Self {
        Self {
            remaining: max,
            max,
            tick,
            last_refill: now,
        }
    }

    /// Take one token if available.
    ///
    /// Returns `true` when the event is admitted. Never blocks.
    pub fn get(&mut self) -> bool {
        if self.remaining > 0 {
            self.remaining -= 1;
            true
        } else {
            false
        }
    }

    /// Credit `n` tokens, clamped to capacity.
    pub fn refund(&mut self, n: usize) {
        self.remaining = self.remaining.saturating_add(n).min(self.max);
    }

    /// Credit one token per whole tick elapsed since the last refill.
    ///
    /// `last_refill` moves forward by exactly the credited ticks, not to `now`.
    /// An instant earlier than the last refill credits nothing. A zero tick
    /// never refills.
    pub fn advance_to(&mut self, now: Instant) {
        let tick_nanos = self.tick.as_nanos();
        if tick_nanos == 0 {
            return;
        }

        let elapsed = now.saturating_duration_since(self.last_refill).as_nanos();
        let ticks = elapsed / tick_nanos;
        if ticks == 0 {
            return;
        }

        self.last_refill += duration_from_nanos(ticks * tick_nanos);
        self.refund(usize::try_from(ticks).unwrap_or(usize::MAX));
    }

    /// Tokens currently available.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Bucket capacity.
    pub fn max(&self) -> usize {
        self.max
    }

    /// Refill interval.
    pub fn tick(&self) -> Duration {
        self.tick
    }

    /// Instant up to which elapsed time has been credited.
    pub fn last_refill(&self) -> Instant {
        self.last_refill
    }
}

// `ticks * tick` never exceeds the elapsed time, which itself came from a Duration.
fn duration_from_nanos(nanos: u128) -> Duration {
    let secs = u64::try_from(nanos / NANOS_PER_SEC).unwrap_or(u64::MAX);
    let subsec = (nanos % NANOS_PER_SEC) as u32;
    Duration::new(secs, subsec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    #[test]
    fn test_starts_full() {
        let bucket = TokenBucket::new(secs(1.0), 5, Instant::now());
        assert_eq!(bucket.remaining(), 5);
        assert_eq!(bucket.max(), 5);
    }

    #[test]
    fn test_burst_then_single_refill() {
        let start = Instant::now();
        let mut bucket = TokenBucket::new(secs(1.0), 5, start);

        for i in 0..5 {
            assert!(bucket.get(), "get {} should be admitted", i);
        }
        assert!(!bucket.get());

        bucket.advance_to(start + secs(1.0));
        assert!(bucket.get());
        assert!(!bucket.get());
    }

    #[test]
    fn test_fractional_tick_is_carried() {
        let start = Instant::now();
        let mut bucket = TokenBucket::new(secs(1.0), 5, start);
        for _ in 0..5 {
            bucket.get();
        }

        bucket.advance_to(start + secs(1.5));
        assert_eq!(bucket.remaining(), 1);
        assert_eq!(bucket.last_refill(), start + secs(1.0));

        bucket.advance_to(start + secs(2.0));
        assert_eq!(bucket.remaining(), 2);
        assert_eq!(bucket.last_refill(), start + secs(2.0));
    }

    #[test]
    fn test_advance_to_same_instant_is_idempotent() {
        let start = Instant::now();
        let mut bucket = TokenBucket::new(secs(1.0), 5, start);
        for _ in 0..5 {
            bucket.get();
        }

        let later = start + secs(3.0);
        bucket.advance_to(later);
        assert_eq!(bucket.remaining(), 3);

        bucket.advance_to(later);
        assert_eq!(bucket.remaining(), 3);
    }

    #[test]
    fn test_refill_clamps_to_capacity() {
        let start = Instant::now();
        let mut bucket = TokenBucket::new(secs(1.0), 3, start);
        bucket.get();

        bucket.advance_to(start + secs(3600.0));
        assert_eq!(bucket.remaining(), 3);
    }

    #[test]
    fn test_refund_saturates() {
        let mut bucket = TokenBucket::new(secs(1.0), 4, Instant::now());
        bucket.get();
        bucket.refund(usize::MAX);
        assert_eq!(bucket.remaining(), 4);
    }

    #[test]
    fn test_earlier_instant_credits_nothing() {
        let start = Instant::now();
        let mut bucket = TokenBucket::new(secs(1.0), 2, start + secs(10.0));
        bucket.get();
        bucket.get();

        bucket.advance_to(start);
        assert_eq!(bucket.remaining(), 0);
        assert_eq!(bucket.last_refill(), start + secs(10.0));
    }

    #[test]
    fn test_zero_capacity_never_admits() {
        let start = Instant::now();
        let mut bucket = TokenBucket::new(secs(1.0), 0, start);
        assert!(!bucket.get());
        bucket.advance_to(start + secs(10.0));
        assert!(!bucket.get());
    }

    #[test]
    fn test_zero_tick_never_refills() {
        let start = Instant::now();
        let mut bucket = TokenBucket::new(Duration::ZERO, 1, start);
        assert!(bucket.get());
        bucket.advance_to(start + secs(10.0));
        assert!(!bucket.get());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Get,
        Refund(usize),
        Advance(u64),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            Just(Op::Get),
            (0usize..20).prop_map(Op::Refund),
            (0u64..5_000).prop_map(Op::Advance),
        ]
    }

    proptest! {
        #[test]
        fn prop_remaining_stays_within_bounds(
            max in 0usize..16,
            tick_ms in 1u64..1_000,
            ops in proptest::collection::vec(op(), 0..200),
        ) {
            let start = Instant::now();
            let mut now = start;
            let mut bucket = TokenBucket::new(Duration::from_millis(tick_ms), max, start);

            for op in ops {
                match op {
                    Op::Get => {
                        let before = bucket.remaining();
                        let admitted = bucket.get();
                        prop_assert_eq!(admitted, before > 0);
                    }
                    Op::Refund(n) => bucket.refund(n),
                    Op::Advance(ms) => {
                        now += Duration::from_millis(ms);
                        bucket.advance_to(now);
                        prop_assert!(bucket.last_refill() <= now);
                    }
                }
                prop_assert!(bucket.remaining() <= bucket.max());
            }
        }
    }
}
