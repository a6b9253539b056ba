use std::collections::HashMap;
use std::sync::RwLock;

use tokio::sync::broadcast;

use crate::document::Document;

const CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

/// A change notification for one document, delivered to `watch`
/// subscribers of its collection.
#[derive(Debug, Clone)]
pub struct DocChange {
    pub collection: String,
    pub id: String,
    pub kind: ChangeKind,
    /// The document after the change; `None` for deletions.
    pub doc: Option<Document>,
}

/// Per-collection broadcast fan-out. Senders are created lazily on first
/// subscribe or publish; a publish with no subscribers is dropped.
pub struct ChangeHub {
    channels: RwLock<HashMap<String, broadcast::Sender<DocChange>>>,
}

impl ChangeHub {
    pub fn new() -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
        }
    }

    pub fn subscribe(&self, collection: &str) -> broadcast::Receiver<DocChange> {
        let mut channels = self.channels.write().expect("change hub lock poisoned");
        channels
            .entry(collection.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    pub fn publish(&self, change: DocChange) {
        let channels = self.channels.read().expect("change hub lock poisoned");
        if let Some(sender) = channels.get(&change.collection) {
            // Receiver lag or disconnect is the subscriber's problem.
            let _ = sender.send(change);
        }
    }
}

impl Default for ChangeHub {
    fn default() -> Self {
        Self::new()
    }
}
