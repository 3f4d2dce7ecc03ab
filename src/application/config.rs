//! Throttle configuration.

use std::time::Duration;

/// Error returned when throttle configuration validation fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThrottleConfigError {
    /// Refill interval must be greater than zero
    ZeroInterval,
    /// Burst capacity must be greater than zero
    ZeroBurst,
    /// Maximum tracked format keys must be greater than zero
    ZeroMaxKeys,
}

impl std::fmt::Display for ThrottleConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThrottleConfigError::ZeroInterval => write!(f, "interval must be greater than 0"),
            ThrottleConfigError::ZeroBurst => write!(f, "burst must be greater than 0"),
            ThrottleConfigError::ZeroMaxKeys => write!(f, "max_keys must be greater than 0"),
        }
    }
}

impl std::error::Error for ThrottleConfigError {}

/// Interval, burst and key bound for the keyed rate limiter.
///
/// Every format key gets a bucket that holds `burst` tokens and earns one
/// token per `interval`. At most `max_keys` buckets are tracked at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottleConfig {
    interval: Duration,
    burst: usize,
    max_keys: usize,
}

impl Default for ThrottleConfig {
    /// 5 second interval, burst of 5, 100 tracked keys.
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            burst: 5,
            max_keys: 100,
        }
    }
}

impl ThrottleConfig {
    /// Create a validated config.
    ///
    /// # Errors
    /// Returns a `ThrottleConfigError` if any value is zero.
    pub fn new(
        interval: Duration,
        burst: usize,
        max_keys: usize,
    ) -> Result<Self, ThrottleConfigError> {
        if interval.is_zero() {
            return Err(ThrottleConfigError::ZeroInterval);
        }
        if burst == 0 {
            return Err(ThrottleConfigError::ZeroBurst);
        }
        if max_keys == 0 {
            return Err(ThrottleConfigError::ZeroMaxKeys);
        }
        Ok(Self {
            interval,
            burst,
            max_keys,
        })
    }

    /// Time that earns one token.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Bucket capacity.
    pub fn burst(&self) -> usize {
        self.burst
    }

    /// Maximum number of tracked format keys.
    pub fn max_keys(&self) -> usize {
        self.max_keys
    }
}
