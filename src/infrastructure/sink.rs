//! `tracing` adapter for the log sink port.

use crate::application::ports::LogSink;
use crate::domain::event::format_message;
use std::fmt::Display;
use tracing::Level;

/// Target of every event emitted by [`TracingSink`].
pub const DEVICE_TARGET: &str = "tunnel_device";

/// Sink that renders each line and emits it as a `tracing` event.
///
/// Events carry the target [`DEVICE_TARGET`] so hosts can route or filter
/// device output with an `EnvFilter` directive such as `tunnel_device=warn`.
#[derive(Debug, Clone, Copy)]
pub struct TracingSink {
    level: Level,
}

impl TracingSink {
    /// Create a sink emitting at `level`.
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    /// Level events are emitted at.
    pub fn level(&self) -> Level {
        self.level
    }
}

impl Default for TracingSink {
    fn default() -> Self {
        Self::new(Level::INFO)
    }
}

impl LogSink for TracingSink {
    fn log(&self, format: &str, args: &[&dyn Display]) {
        let message = format_message(format, args);
        // Event levels are part of static callsite metadata, hence one macro per level.
        if self.level == Level::ERROR {
            tracing::error!(target: DEVICE_TARGET, "{}", message);
        } else if self.level == Level::WARN {
            tracing::warn!(target: DEVICE_TARGET, "{}", message);
        } else if self.level == Level::INFO {
            tracing::info!(target: DEVICE_TARGET, "{}", message);
        } else if self.level == Level::DEBUG {
            tracing::debug!(target: DEVICE_TARGET, "{}", message);
        } else {
            tracing::trace!(target: DEVICE_TARGET, "{}", message);
        }
    }
}
