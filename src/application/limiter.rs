//! Keyed rate limiting.
//!
//! Every format key is throttled by its own token bucket, so one chatty message
//! pattern cannot use up the allowance of the others.

use crate::application::ports::Storage;
use crate::application::registry::BucketRegistry;
use crate::domain::{event::FormatKey, token_bucket::TokenBucket};

/// Decision about how to handle an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitDecision {
    /// Allow the event to pass through
    Allow,
    /// Suppress the event
    Suppress,
}

impl LimitDecision {
    /// Check if this decision is Allow.
    pub fn is_allow(&self) -> bool {
        matches!(self, LimitDecision::Allow)
    }

    /// Check if this decision is Suppress.
    pub fn is_suppress(&self) -> bool {
        matches!(self, LimitDecision::Suppress)
    }
}

/// Coordinates rate limiting decisions.
#[derive(Clone)]
pub struct RateLimiter<S>
where
    S: Storage<FormatKey, TokenBucket> + Clone,
{
    registry: BucketRegistry<S>,
}

impl<S> RateLimiter<S>
where
    S: Storage<FormatKey, TokenBucket> + Clone,
{
    /// Create a new rate limiter over a bucket registry.
    pub fn new(registry: BucketRegistry<S>) -> Self {
        Self { registry }
    }

    /// Decide whether one more event for `key` is admitted.
    ///
    /// The key's bucket is first credited for the whole ticks elapsed since its
    /// last refill, then asked for a token. Suppression is silent.
    pub fn check(&self, key: FormatKey) -> LimitDecision {
        self.registry.with_bucket(key, |bucket, now| {
            bucket.advance_to(now);
            if bucket.get() {
                LimitDecision::Allow
            } else {
                LimitDecision::Suppress
            }
        })
    }

    /// Get a reference to the registry.
    pub fn registry(&self) -> &BucketRegistry<S> {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::config::ThrottleConfig;
    use crate::infrastructure::clock::SystemClock;
    use crate::infrastructure::eviction::LruEviction;
    use crate::infrastructure::mocks::MockClock;
    use crate::infrastructure::storage::ShardedStorage;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    fn limiter_with_clock(
        burst: usize,
        clock: Arc<MockClock>,
    ) -> RateLimiter<Arc<ShardedStorage<FormatKey, TokenBucket>>> {
        let config = ThrottleConfig::new(Duration::from_secs(1), burst, 100).unwrap();
        let registry = BucketRegistry::new(
            Arc::new(ShardedStorage::new()),
            clock,
            config,
            Arc::new(LruEviction::new()),
        );
        RateLimiter::new(registry)
    }

    #[test]
    fn test_rate_limiter_basic() {
        let clock = Arc::new(MockClock::new(Instant::now()));
        let limiter = limiter_with_clock(2, clock);
        let key = FormatKey::template("Test message");

        assert_eq!(limiter.check(key.clone()), LimitDecision::Allow);
        assert_eq!(limiter.check(key.clone()), LimitDecision::Allow);
        assert_eq!(limiter.check(key.clone()), LimitDecision::Suppress);
        assert_eq!(limiter.check(key), LimitDecision::Suppress);
    }

    #[test]
    fn test_rate_limiter_refills_per_tick() {
        let clock = Arc::new(MockClock::new(Instant::now()));
        let limiter = limiter_with_clock(5, clock.clone());
        let key = FormatKey::template("Test");

        for _ in 0..5 {
            assert!(limiter.check(key.clone()).is_allow());
        }
        assert!(limiter.check(key.clone()).is_suppress());

        clock.advance(Duration::from_millis(1500));
        assert!(limiter.check(key.clone()).is_allow());
        assert!(limiter.check(key.clone()).is_suppress());

        // The half tick carried over completes here
        clock.advance(Duration::from_millis(500));
        assert!(limiter.check(key.clone()).is_allow());
        assert!(limiter.check(key).is_suppress());
    }

    #[test]
    fn test_rate_limiter_different_keys() {
        let clock = Arc::new(MockClock::new(Instant::now()));
        let limiter = limiter_with_clock(1, clock);

        let key1 = FormatKey::template("Message 1");
        let key2 = FormatKey::template("Message 2");

        assert_eq!(limiter.check(key1.clone()), LimitDecision::Allow);
        assert_eq!(limiter.check(key2.clone()), LimitDecision::Allow);
        assert_eq!(limiter.check(FormatKey::Rewritten), LimitDecision::Allow);

        assert_eq!(limiter.check(key1), LimitDecision::Suppress);
        assert_eq!(limiter.check(key2), LimitDecision::Suppress);
        assert_eq!(limiter.check(FormatKey::Rewritten), LimitDecision::Suppress);
    }

    #[test]
    fn test_tracked_keys_respect_max_keys() {
        let config = ThrottleConfig::new(Duration::from_secs(5), 5, 10).unwrap();
        let registry = BucketRegistry::new(
            Arc::new(ShardedStorage::new()),
            Arc::new(SystemClock::new()),
            config,
            Arc::new(LruEviction::new()),
        );
        let limiter = RateLimiter::new(registry);

        for i in 0..500 {
            let decision = limiter.check(FormatKey::template(format!("distinct {}", i)));
            assert!(decision.is_allow());
        }

        assert_eq!(limiter.registry().len(), 10);
    }

    #[test]
    fn test_concurrent_rate_limiting() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::thread;

        let config = ThrottleConfig::new(Duration::from_secs(3600), 50, 100).unwrap();
        let registry = BucketRegistry::new(
            Arc::new(ShardedStorage::new()),
            Arc::new(SystemClock::new()),
            config,
            Arc::new(LruEviction::new()),
        );
        let limiter = Arc::new(RateLimiter::new(registry));
        let allowed = Arc::new(AtomicUsize::new(0));
        let mut handles = vec![];

        for _ in 0..10 {
            let limiter = Arc::clone(&limiter);
            let allowed = Arc::clone(&allowed);
            handles.push(thread::spawn(move || {
                for _ in 0..20 {
                    if limiter.check(FormatKey::template("Concurrent test")).is_allow() {
                        allowed.fetch_add(1, Ordering::Relaxed);
                    }
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        // 200 attempts against a single bucket of 50 that cannot refill in time
        assert_eq!(allowed.load(Ordering::Relaxed), 50);
    }
}
