//! The device logger facade and its builder.
//!
//! [`TunnelLogger`] is what a host hands to the tunnel device. It implements
//! [`DeviceLogger`], runs every line through the pipeline and accepts peer-set
//! updates that change how peer identifiers are rewritten.

use crate::application::{
    config::{ThrottleConfig, ThrottleConfigError},
    limiter::RateLimiter,
    pipeline::{Outcome, Pipeline, Severity},
    ports::{Clock, DeviceLogger, EvictionPolicy, LogSink, Storage},
    publisher::RewritePublisher,
    registry::BucketRegistry,
};
use crate::domain::{event::FormatKey, peer::Peer, token_bucket::TokenBucket};
use crate::infrastructure::clock::SystemClock;
use crate::infrastructure::eviction::{FifoEviction, LruEviction};
use crate::infrastructure::sink::TracingSink;
use crate::infrastructure::storage::ShardedStorage;

use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

/// Error returned when building a [`TunnelLogger`] fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// Throttle configuration validation failed
    Config(ThrottleConfigError),
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildError::Config(e) => write!(f, "throttle configuration error: {}", e),
        }
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BuildError::Config(e) => Some(e),
        }
    }
}

impl From<ThrottleConfigError> for BuildError {
    fn from(e: ThrottleConfigError) -> Self {
        BuildError::Config(e)
    }
}

/// Which bucket to give up when the format key bound is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvictionStrategy {
    /// Evict the key used least recently (default)
    #[default]
    Lru,
    /// Evict the key created first
    Fifo,
}

impl EvictionStrategy {
    fn into_policy(self) -> Arc<dyn EvictionPolicy<FormatKey>> {
        match self {
            EvictionStrategy::Lru => Arc::new(LruEviction::new()),
            EvictionStrategy::Fifo => Arc::new(FifoEviction::new()),
        }
    }
}

/// Builder for constructing a [`TunnelLogger`].
pub struct TunnelLoggerBuilder {
    interval: Duration,
    burst: usize,
    max_keys: usize,
    eviction_strategy: EvictionStrategy,
    clock: Option<Arc<dyn Clock>>,
    sink: Option<Arc<dyn LogSink>>,
}

impl TunnelLoggerBuilder {
    /// Set the interval that earns each format key one more line.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set how many lines a format key may emit back to back.
    pub fn with_burst(mut self, burst: usize) -> Self {
        self.burst = burst;
        self
    }

    /// Set the maximum number of format keys tracked at once.
    ///
    /// When a new key arrives at the limit, one existing key's bucket is
    /// evicted according to the eviction strategy.
    pub fn with_max_keys(mut self, max_keys: usize) -> Self {
        self.max_keys = max_keys;
        self
    }

    /// Set the eviction strategy.
    pub fn with_eviction_strategy(mut self, strategy: EvictionStrategy) -> Self {
        self.eviction_strategy = strategy;
        self
    }

    /// Set a custom clock (mainly for testing).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Set the sink that receives surviving lines.
    ///
    /// Defaults to a [`TracingSink`] at `INFO`.
    pub fn with_sink(mut self, sink: impl LogSink + 'static) -> Self {
        self.sink = Some(Arc::new(sink));
        self
    }

    /// Build the logger.
    ///
    /// # Errors
    /// Returns `BuildError` if the configuration is invalid.
    pub fn build(self) -> Result<TunnelLogger, BuildError> {
        let config = ThrottleConfig::new(self.interval, self.burst, self.max_keys)?;

        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock::new()));
        let sink = self
            .sink
            .unwrap_or_else(|| Arc::new(TracingSink::default()));

        let registry = BucketRegistry::new(
            Arc::new(ShardedStorage::new()),
            clock,
            config,
            self.eviction_strategy.into_policy(),
        );
        let publisher = Arc::new(RewritePublisher::new());

        Ok(TunnelLogger {
            pipeline: Pipeline::new(publisher, RateLimiter::new(registry), sink),
        })
    }
}

/// Log adapter for a tunnel device.
///
/// Filters known noise, rewrites device peer identifiers into short
/// identifiers and throttles each format key with its own token bucket.
/// Cloning is cheap and clones share all state.
///
/// # Example
/// ```
/// use tunnel_log_throttle::{DeviceLogger, Peer, PublicKey, TunnelLogger};
/// use tunnel_log_throttle::infrastructure::mocks::CaptureSink;
///
/// let sink = CaptureSink::new();
/// let logger = TunnelLogger::builder().with_sink(sink.clone()).build().unwrap();
///
/// let key = PublicKey::new([0u8; 32]);
/// logger.set_peers(&[Peer::new(key)]);
///
/// logger.verbose("Routine: {} - started", &[&"decryption worker"]);
/// logger.error("{} - Failed to send handshake", &[&key.wire_identifier()]);
///
/// assert_eq!(
///     sink.messages(),
///     vec!["<RATELIMITED>[AAAAA] - Failed to send handshake".to_string()]
/// );
/// ```
#[derive(Clone, Debug)]
pub struct TunnelLogger<S = Arc<ShardedStorage<FormatKey, TokenBucket>>>
where
    S: Storage<FormatKey, TokenBucket> + Clone,
{
    pipeline: Pipeline<S>,
}

impl TunnelLogger<Arc<ShardedStorage<FormatKey, TokenBucket>>> {
    /// Create a builder for configuring the logger.
    ///
    /// Defaults:
    /// - Interval: 5 seconds
    /// - Burst: 5 lines
    /// - Max keys: 100 (with LRU eviction)
    /// - Sink: `TracingSink` at `INFO`
    pub fn builder() -> TunnelLoggerBuilder {
        let defaults = ThrottleConfig::default();
        TunnelLoggerBuilder {
            interval: defaults.interval(),
            burst: defaults.burst(),
            max_keys: defaults.max_keys(),
            eviction_strategy: EvictionStrategy::default(),
            clock: None,
            sink: None,
        }
    }

    /// Create a logger with default settings that logs through `tracing`.
    pub fn new() -> Self {
        Self::with_config(ThrottleConfig::default(), TracingSink::default())
    }

    /// Create a logger from an already validated config.
    pub fn with_config(config: ThrottleConfig, sink: impl LogSink + 'static) -> Self {
        let registry = BucketRegistry::new(
            Arc::new(ShardedStorage::new()),
            Arc::new(SystemClock::new()),
            config,
            EvictionStrategy::default().into_policy(),
        );
        Self {
            pipeline: Pipeline::new(
                Arc::new(RewritePublisher::new()),
                RateLimiter::new(registry),
                Arc::new(sink),
            ),
        }
    }
}

impl Default for TunnelLogger<Arc<ShardedStorage<FormatKey, TokenBucket>>> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> TunnelLogger<S>
where
    S: Storage<FormatKey, TokenBucket> + Clone,
{
    /// Create a logger over an existing pipeline, e.g. one with custom storage.
    pub fn from_pipeline(pipeline: Pipeline<S>) -> Self {
        Self { pipeline }
    }

    /// Rewrite the device identifiers of `peers` from now on.
    ///
    /// Replaces the whole rewrite table. Safe for concurrent use; when updates
    /// race, the last one wins.
    pub fn set_peers(&self, peers: &[Peer]) {
        self.pipeline.publisher().set_peers(peers);
    }

    /// Run one line through the pipeline and report what happened to it.
    pub fn log(&self, severity: Severity, format: &str, args: &[&dyn Display]) -> Outcome {
        self.pipeline.log(severity, format, args)
    }

    /// Get the current number of tracked format keys.
    pub fn key_count(&self) -> usize {
        self.pipeline.limiter().registry().len()
    }

    /// Get a reference to the underlying pipeline.
    pub fn pipeline(&self) -> &Pipeline<S> {
        &self.pipeline
    }
}

impl<S> DeviceLogger for TunnelLogger<S>
where
    S: Storage<FormatKey, TokenBucket> + Clone,
{
    fn verbose(&self, format: &str, args: &[&dyn Display]) {
        self.pipeline.log(Severity::Verbose, format, args);
    }

    fn error(&self, format: &str, args: &[&dyn Display]) {
        self.pipeline.log(Severity::Error, format, args);
    }
}
