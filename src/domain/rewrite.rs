//! Immutable identifier substitution table.
//!
//! A table maps device-format peer identifiers onto stable short identifiers.
//! Tables are never edited once built; a configuration change builds a new one.

use crate::domain::peer::Peer;
use std::borrow::Cow;

/// Ordered `(old, new)` substitution pairs applied in a single pass.
///
/// At each position of the input the first pair (in table order) whose `old`
/// text matches is replaced and scanning resumes after the match. Replaced text
/// is never rescanned.
///
/// # Example
/// ```
/// use tunnel_log_throttle::RewriteTable;
///
/// let table = RewriteTable::new(vec![
///     ("peer(AAAA…AAAA)".to_string(), "[AAAAA]".to_string()),
/// ]);
///
/// let out = table.rewrite("handshake from peer(AAAA…AAAA) ok");
/// assert_eq!(out, "handshake from [AAAAA] ok");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteTable {
    pairs: Vec<(String, String)>,
}

impl RewriteTable {
    /// Build a table from substitution pairs. Pairs with an empty `old` are skipped.
    pub fn new(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            pairs: pairs
                .into_iter()
                .filter(|(old, _)| !old.is_empty())
                .collect(),
        }
    }

    /// Build the table mapping each peer's device identifier to its short identifier.
    pub fn from_peers<'a>(peers: impl IntoIterator<Item = &'a Peer>) -> Self {
        Self::new(peers.into_iter().map(|peer| {
            (
                peer.public_key.wire_identifier(),
                peer.public_key.short_string(),
            )
        }))
    }

    /// Apply every pair to `message`.
    ///
    /// Returns `Cow::Borrowed` when nothing matched and `Cow::Owned` when at
    /// least one substitution was made.
    pub fn rewrite<'a>(&self, message: &'a str) -> Cow<'a, str> {
        if self.pairs.is_empty() {
            return Cow::Borrowed(message);
        }

        let mut out: Option<String> = None;
        let mut copied = 0;
        let mut pos = 0;

        while pos < message.len() {
            let rest = &message[pos..];
            match self.match_at(rest) {
                Some((old, new)) => {
                    let buf = out.get_or_insert_with(|| String::with_capacity(message.len()));
                    buf.push_str(&message[copied..pos]);
                    buf.push_str(new);
                    pos += old.len();
                    copied = pos;
                }
                None => {
                    pos += rest.chars().next().map_or(1, char::len_utf8);
                }
            }
        }

        match out {
            Some(mut buf) => {
                buf.push_str(&message[copied..]);
                Cow::Owned(buf)
            }
            None => Cow::Borrowed(message),
        }
    }

    fn match_at(&self, rest: &str) -> Option<(&str, &str)> {
        self.pairs
            .iter()
            .find(|(old, _)| rest.starts_with(old.as_str()))
            .map(|(old, new)| (old.as_str(), new.as_str()))
    }

    /// Substitution pairs in table order.
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Check if the table has no pairs.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
