//! The filter, rewrite and throttle pipeline.
//!
//! Every device log line, of either severity, runs through the same stages:
//!
//! 1. **Filter**: the formatted message is checked against the drop rules.
//! 2. **Rewrite**: device peer identifiers are replaced using the live table.
//! 3. **Throttle**: the message's format key must win a token from its bucket.
//!
//! Survivors reach the sink with [`RATE_LIMITED_MARKER`] prepended to their
//! format string. Dropped and suppressed lines produce no output at all.

use crate::application::limiter::RateLimiter;
use crate::application::ports::{LogSink, Storage};
use crate::application::publisher::RewritePublisher;
use crate::domain::event::{FormatKey, LogEvent, LITERAL_FORMAT};
use crate::domain::filter::{drop_rule_for, DropRule};
use crate::domain::token_bucket::TokenBucket;
use std::borrow::Cow;
use std::fmt::{self, Display};
use std::sync::Arc;

/// Prepended to the format string of informational lines.
pub const VERBOSE_PREFIX: &str = "[v2] ";

/// Prepended to the format string of every line forwarded to the sink.
pub const RATE_LIMITED_MARKER: &str = "<RATELIMITED>";

/// Severity of a device log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Informational output, prefixed with [`VERBOSE_PREFIX`]
    Verbose,
    /// Error output, passed through unprefixed
    Error,
}

/// What happened to one log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Discarded by a drop rule
    Filtered(DropRule),
    /// Discarded because its bucket had no tokens
    Suppressed,
    /// Forwarded to the sink
    Emitted {
        /// Whether peer identifiers were rewritten
        rewritten: bool,
    },
}

impl Outcome {
    /// Check if the line reached the sink.
    pub fn is_emitted(&self) -> bool {
        matches!(self, Outcome::Emitted { .. })
    }
}

/// The filter, rewrite and throttle pipeline.
///
/// Holds no per-call state; safe to call from many threads at once.
#[derive(Clone)]
pub struct Pipeline<S>
where
    S: Storage<FormatKey, TokenBucket> + Clone,
{
    publisher: Arc<RewritePublisher>,
    limiter: RateLimiter<S>,
    sink: Arc<dyn LogSink>,
}

impl<S> Pipeline<S>
where
    S: Storage<FormatKey, TokenBucket> + Clone,
{
    /// Create a pipeline.
    pub fn new(
        publisher: Arc<RewritePublisher>,
        limiter: RateLimiter<S>,
        sink: Arc<dyn LogSink>,
    ) -> Self {
        Self {
            publisher,
            limiter,
            sink,
        }
    }

    /// Run one device log line of the given severity through the pipeline.
    pub fn log(&self, severity: Severity, format: &str, args: &[&dyn Display]) -> Outcome {
        match severity {
            Severity::Error => self.process(LogEvent::new(format, args)),
            Severity::Verbose => {
                let prefixed = format!("{}{}", VERBOSE_PREFIX, format);
                self.process(LogEvent::new(&prefixed, args))
            }
        }
    }

    /// Run one event through filter, rewrite and throttle.
    pub fn process(&self, event: LogEvent<'_>) -> Outcome {
        let message = event.message();

        if let Some(rule) = drop_rule_for(&message) {
            return Outcome::Filtered(rule);
        }

        let rewritten = self
            .publisher
            .current()
            .and_then(|table| match table.rewrite(&message) {
                Cow::Owned(text) => Some(text),
                Cow::Borrowed(_) => None,
            });

        match rewritten {
            Some(text) => self.throttle(FormatKey::Rewritten, LITERAL_FORMAT, &[&text], true),
            None => self.throttle(
                FormatKey::template(event.format),
                event.format,
                event.args,
                false,
            ),
        }
    }

    fn throttle(
        &self,
        key: FormatKey,
        format: &str,
        args: &[&dyn Display],
        rewritten: bool,
    ) -> Outcome {
        if self.limiter.check(key).is_suppress() {
            return Outcome::Suppressed;
        }

        let marked = format!("{}{}", RATE_LIMITED_MARKER, format);
        self.sink.log(&marked, args);
        Outcome::Emitted { rewritten }
    }

    /// Get a reference to the rewrite publisher.
    pub fn publisher(&self) -> &Arc<RewritePublisher> {
        &self.publisher
    }

    /// Get a reference to the limiter.
    pub fn limiter(&self) -> &RateLimiter<S> {
        &self.limiter
    }
}

impl<S> fmt::Debug for Pipeline<S>
where
    S: Storage<FormatKey, TokenBucket> + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("publisher", &self.publisher)
            .field("tracked_keys", &self.limiter.registry().len())
            .finish()
    }
}
