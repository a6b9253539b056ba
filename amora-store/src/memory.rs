use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio::sync::RwLock;

use crate::document::{merge_fields, Document, Predicate};
use crate::error::{StoreError, StoreResult};
use crate::store::DocumentStore;
use crate::watch::{ChangeHub, ChangeKind, DocChange};

/// In-memory [`DocumentStore`] backend.
///
/// Documents are held per collection in a `BTreeMap` so queries walk them
/// in a stable id order. Every mutation publishes a [`DocChange`] to the
/// collection's watch channel.
pub struct MemoryStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Document>>>,
    hub: ChangeHub,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            hub: ChangeHub::new(),
        }
    }

    fn publish(&self, collection: &str, id: &str, kind: ChangeKind, doc: Option<Document>) {
        self.hub.publish(DocChange {
            collection: collection.to_string(),
            id: id.to_string(),
            kind,
            doc,
        });
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn set(&self, collection: &str, id: &str, doc: Document, merge: bool) -> StoreResult<()> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();

        let kind = if docs.contains_key(id) {
            ChangeKind::Updated
        } else {
            ChangeKind::Created
        };
        let slot = docs.entry(id.to_string()).or_insert(Document::Null);
        if kind == ChangeKind::Updated && merge {
            merge_fields(slot, doc);
        } else {
            *slot = doc;
        }
        let written = slot.clone();
        drop(collections);

        self.publish(collection, id, kind, Some(written));
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, patch: Document) -> StoreResult<()> {
        let mut collections = self.collections.write().await;
        let existing = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::not_found(collection, id))?;

        if let (Some(target), Some(fields)) = (existing.as_object_mut(), patch.as_object()) {
            for (key, value) in fields {
                target.insert(key.clone(), value.clone());
            }
        }
        let written = existing.clone();
        drop(collections);

        self.publish(collection, id, ChangeKind::Updated, Some(written));
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()> {
        let mut collections = self.collections.write().await;
        let removed = collections
            .get_mut(collection)
            .and_then(|docs| docs.remove(id))
            .is_some();
        drop(collections);

        if removed {
            self.publish(collection, id, ChangeKind::Deleted, None);
        }
        Ok(())
    }

    async fn query(
        &self,
        collection: &str,
        predicates: &[Predicate],
        limit: Option<usize>,
    ) -> StoreResult<Vec<(String, Document)>> {
        let collections = self.collections.read().await;
        let Some(docs) = collections.get(collection) else {
            return Ok(vec![]);
        };

        let matches = docs
            .iter()
            .filter(|(_, doc)| predicates.iter().all(|p| p.matches(doc)))
            .map(|(id, doc)| (id.clone(), doc.clone()));

        Ok(match limit {
            Some(n) => matches.take(n).collect(),
            None => matches.collect(),
        })
    }

    fn watch(&self, collection: &str) -> broadcast::Receiver<DocChange> {
        self.hub.subscribe(collection)
    }
}
