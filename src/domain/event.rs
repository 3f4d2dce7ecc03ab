//! Device log events and their rate-limit identity.
//!
//! A device log call is a format string plus arguments. Format strings use `{}`
//! placeholders filled left to right; `{{` and `}}` are literal braces. The
//! arguments are rendered once, before any rule or rewrite looks at the text.

use std::fmt::{self, Display, Write as _};

/// Format string used once a message has been rewritten to literal text.
pub const LITERAL_FORMAT: &str = "{}";

/// A single log call from the tunnel device.
#[derive(Clone, Copy)]
pub struct LogEvent<'a> {
    /// Format string with `{}` placeholders
    pub format: &'a str,
    /// Arguments consumed by the placeholders, in order
    pub args: &'a [&'a dyn Display],
}

impl<'a> LogEvent<'a> {
    /// Create an event.
    pub fn new(format: &'a str, args: &'a [&'a dyn Display]) -> Self {
        Self { format, args }
    }

    /// Render the event into its literal message.
    pub fn message(&self) -> String {
        format_message(self.format, self.args)
    }
}

impl fmt::Debug for LogEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogEvent")
            .field("format", &self.format)
            .field("args", &self.args.len())
            .finish()
    }
}

/// Render `format` with `args`.
///
/// Placeholders without a matching argument stay as a literal `{}`. Surplus
/// arguments are ignored.
///
/// # Example
/// ```
/// use tunnel_log_throttle::domain::event::format_message;
///
/// let msg = format_message("{} sent {} bytes {{ok}}", &[&"peer", &42]);
/// assert_eq!(msg, "peer sent 42 bytes {ok}");
/// ```
pub fn format_message(format: &str, args: &[&dyn Display]) -> String {
    let mut out = String::with_capacity(format.len() + args.len() * 8);
    let mut args = args.iter();
    let mut chars = format.chars().peekable();

    while let Some(c) = chars.next() {
        match (c, chars.peek()) {
            ('{', Some('{')) => {
                chars.next();
                out.push('{');
            }
            ('}', Some('}')) => {
                chars.next();
                out.push('}');
            }
            ('{', Some('}')) => {
                chars.next();
                match args.next() {
                    // Writing into a String cannot fail.
                    Some(arg) => {
                        let _ = write!(out, "{}", arg);
                    }
                    None => out.push_str("{}"),
                }
            }
            _ => out.push(c),
        }
    }

    out
}

/// Identity used to pick a rate-limit bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FormatKey {
    /// The caller's original format string
    Template(String),
    /// Any message whose peer identifiers were rewritten into literal text
    Rewritten,
}

impl FormatKey {
    /// Key for an unrewritten event.
    pub fn template(format: impl Into<String>) -> Self {
        FormatKey::Template(format.into())
    }

    /// Format string this key forwards to the sink.
    pub fn format(&self) -> &str {
        match self {
            FormatKey::Template(format) => format,
            FormatKey::Rewritten => LITERAL_FORMAT,
        }
    }
}

impl fmt::Display for FormatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.format())
    }
}
