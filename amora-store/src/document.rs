use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{StoreError, StoreResult};

/// A stored document. Always a JSON object at the top level.
pub type Document = Value;

/// Serialize a typed model into a document.
pub fn to_document<T: Serialize>(value: &T) -> StoreResult<Document> {
    Ok(serde_json::to_value(value)?)
}

/// Deserialize a document into a typed model.
pub fn from_document<T: DeserializeOwned>(doc: Document) -> StoreResult<T> {
    Ok(serde_json::from_value(doc)?)
}

/// Merge `patch` into `target`, field by field. Nested objects merge
/// recursively; any other value replaces the existing one. This mirrors a
/// set-with-merge write: untouched fields survive.
pub fn merge_fields(target: &mut Document, patch: Document) {
    match (target, patch) {
        (Value::Object(existing), Value::Object(incoming)) => {
            for (key, value) in incoming {
                match existing.get_mut(&key) {
                    Some(slot) if slot.is_object() && value.is_object() => {
                        merge_fields(slot, value);
                    }
                    _ => {
                        existing.insert(key, value);
                    }
                }
            }
        }
        (target, patch) => *target = patch,
    }
}

/// A single query constraint against a top-level document field.
#[derive(Debug, Clone)]
pub struct Predicate {
    pub field: String,
    pub op: Op,
}

#[derive(Debug, Clone)]
pub enum Op {
    /// Field equals the given value.
    Eq(Value),
    /// Field is an array containing the given value.
    ArrayContains(Value),
}

impl Predicate {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op: Op::Eq(value.into()),
        }
    }

    pub fn array_contains(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op: Op::ArrayContains(value.into()),
        }
    }

    /// Whether `doc` satisfies this constraint. A missing field never
    /// matches.
    pub fn matches(&self, doc: &Document) -> bool {
        let Some(field_value) = doc.get(&self.field) else {
            return false;
        };
        match &self.op {
            Op::Eq(expected) => field_value == expected,
            Op::ArrayContains(needle) => field_value
                .as_array()
                .is_some_and(|items| items.contains(needle)),
        }
    }
}
