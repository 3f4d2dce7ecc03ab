//! Publication of the current rewrite table.
//!
//! The publisher holds a single atomically swappable slot. Readers load the
//! current table without locking and always see either no table or one
//! complete table. Writers build a fresh table and swap it in whole.

use crate::domain::{peer::Peer, rewrite::RewriteTable};
use arc_swap::ArcSwapOption;
use std::sync::Arc;
use tracing::{debug, trace};

/// Atomically swappable slot holding the live rewrite table.
///
/// Cloning is not provided; share the publisher behind an `Arc` instead.
#[derive(Debug, Default)]
pub struct RewritePublisher {
    slot: ArcSwapOption<RewriteTable>,
}

impl RewritePublisher {
    /// Create a publisher with no table.
    pub fn new() -> Self {
        Self {
            slot: ArcSwapOption::empty(),
        }
    }

    /// Replace the table with one built from `peers`.
    ///
    /// Safe for concurrent use. When updates race, the last store wins.
    pub fn set_peers(&self, peers: &[Peer]) {
        let table = RewriteTable::from_peers(peers);
        for peer in peers {
            trace!(
                peer = %peer.public_key.short_string(),
                name = peer.name.as_deref().unwrap_or("-"),
                "rewriting peer identifier"
            );
        }
        debug!(peers = peers.len(), "publishing peer rewrite table");
        self.publish(table);
    }

    /// Replace the table with `table`.
    pub fn publish(&self, table: RewriteTable) {
        self.slot.store(Some(Arc::new(table)));
    }

    /// Remove the table; later messages pass through unrewritten.
    pub fn clear(&self) {
        self.slot.store(None);
    }

    /// Snapshot of the live table, if one has been published.
    pub fn current(&self) -> Option<Arc<RewriteTable>> {
        self.slot.load_full()
    }
}
