//! Generic document-store abstraction.
//!
//! Profiles, likes, passes, conversations and presence all live in an
//! external document database reached through the [`DocumentStore`] trait:
//! flat collections of JSON documents addressed by string ids, with simple
//! equality / array-contains queries and a per-collection change stream.
//! [`MemoryStore`] is the in-process backend used by the service in local
//! deployments and by every test.

pub mod document;
pub mod error;
pub mod memory;
pub mod store;
pub mod watch;

pub use document::{from_document, merge_fields, to_document, Document, Op, Predicate};
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use store::DocumentStore;
pub use watch::{ChangeKind, DocChange};

/// Collection names are part of the wire contract with existing data.
pub mod collections {
    pub const PROFILES: &str = "profiles";
    pub const LIKES: &str = "likes";
    pub const PASSES: &str = "passes";
    pub const CONVERSATIONS: &str = "conversations";
    pub const PRESENCE: &str = "presence";

    /// Messages live in a per-conversation sub-collection.
    pub fn messages(conversation_id: &str) -> String {
        format!("{CONVERSATIONS}/{conversation_id}/messages")
    }
}
