use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::document::{Document, Predicate};
use crate::error::StoreResult;
use crate::watch::DocChange;

/// The document database seam.
///
/// Collections are flat namespaces of JSON documents addressed by string
/// ids. Implementations are expected to be cheap to clone behind an `Arc`
/// and safe to call concurrently.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch one document, or `None` if absent.
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>>;

    /// Write a document. With `merge`, fields are merged into any existing
    /// document ([`crate::merge_fields`]); otherwise the document is
    /// replaced wholesale. Creates the document if absent either way.
    async fn set(&self, collection: &str, id: &str, doc: Document, merge: bool) -> StoreResult<()>;

    /// Patch top-level fields of an existing document. Errors with
    /// `NotFound` when the document does not exist.
    async fn update(&self, collection: &str, id: &str, patch: Document) -> StoreResult<()>;

    /// Remove a document. Deleting an absent document is not an error.
    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()>;

    /// Fetch documents matching every predicate, up to `limit`.
    async fn query(
        &self,
        collection: &str,
        predicates: &[Predicate],
        limit: Option<usize>,
    ) -> StoreResult<Vec<(String, Document)>>;

    /// Subscribe to changes in one collection.
    fn watch(&self, collection: &str) -> broadcast::Receiver<DocChange>;
}
