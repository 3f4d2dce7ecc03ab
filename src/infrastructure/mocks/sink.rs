//! Capturing log sink for testing.

use crate::application::ports::LogSink;
use crate::domain::event::format_message;
use std::fmt::Display;
use std::sync::{Arc, Mutex};

/// Sink that records every line it receives.
///
/// Clones share the same buffer, so a test can hand one clone to the pipeline
/// and inspect another.
///
/// # Examples
///
/// ```
/// use tunnel_log_throttle::infrastructure::mocks::CaptureSink;
/// use tunnel_log_throttle::LogSink;
///
/// let sink = CaptureSink::new();
/// sink.log("{} bytes", &[&42]);
///
/// let lines = sink.get_captured();
/// assert_eq!(lines[0].format, "{} bytes");
/// assert_eq!(lines[0].message, "42 bytes");
/// ```
#[derive(Debug, Clone, Default)]
pub struct CaptureSink {
    captured: Arc<Mutex<Vec<CapturedLine>>>,
}

/// Captured line information.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct CapturedLine {
    /// Format string as received by the sink
    pub format: String,
    /// Fully rendered message
    pub message: String,
}

impl CaptureSink {
    /// Create a new capture sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all captured lines.
    pub fn get_captured(&self) -> Vec<CapturedLine> {
        self.captured
            .lock()
            .expect("CaptureSink mutex poisoned - a test thread panicked while holding the lock")
            .clone()
    }

    /// Get the rendered messages only.
    pub fn messages(&self) -> Vec<String> {
        self.get_captured()
            .into_iter()
            .map(|line| line.message)
            .collect()
    }

    /// Get the count of captured lines.
    pub fn count(&self) -> usize {
        self.captured
            .lock()
            .expect("CaptureSink mutex poisoned - a test thread panicked while holding the lock")
            .len()
    }

    /// Clear all captured lines.
    pub fn clear(&self) {
        self.captured
            .lock()
            .expect("CaptureSink mutex poisoned - a test thread panicked while holding the lock")
            .clear();
    }
}

impl LogSink for CaptureSink {
    fn log(&self, format: &str, args: &[&dyn Display]) {
        let line = CapturedLine {
            format: format.to_string(),
            message: format_message(format, args),
        };
        self.captured
            .lock()
            .expect("CaptureSink mutex poisoned - a test thread panicked while holding the lock")
            .push(line);
    }
}
