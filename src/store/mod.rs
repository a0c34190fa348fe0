use async_trait::async_trait;
use serde_json::Value;

use crate::Status;

mod firestore;
mod memory;

pub use firestore::FirestoreStore;
pub use memory::MemoryStore;

/// Narrow boundary between the catalog core and whatever document database
/// backs it. Documents cross the boundary as JSON objects; adapters own id
/// assignment and store every collection independently.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Inserts `doc` in `collection` with a fresh unique id and returns the
    /// stored document, id included.
    async fn insert_one(&self, collection: &str, doc: Value) -> Result<Value, Status>;

    /// Returns the first document in `collection` matching `filter`.
    async fn find_one(&self, collection: &str, filter: Filter) -> Result<Option<Value>, Status>;

    async fn find(&self, collection: &str, filter: Filter) -> Result<Vec<Value>, Status>;

    /// Replaces the document with id `doc_id` wholesale. Fails with NotFound
    /// when no such document exists.
    async fn replace_one(&self, collection: &str, doc_id: &str, doc: Value)
        -> Result<Value, Status>;

    /// Deletes the document with id `doc_id`. Deleting an absent document is
    /// not an error.
    async fn delete_one(&self, collection: &str, doc_id: &str) -> Result<(), Status>;
}

/// Document selection for `find`/`find_one`. `Eq` fields are dotted paths
/// into the document; an array along the path matches if any element does.
#[derive(Clone, Debug)]
pub enum Filter {
    All,
    Eq { field: String, value: Value },
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn matches(&self, doc: &Value) -> bool {
        match self {
            Filter::All => true,
            Filter::Eq { field, value } => {
                let segments = field.split('.').collect::<Vec<_>>();
                matches_path(doc, &segments, value)
            }
        }
    }
}

fn matches_path(doc: &Value, segments: &[&str], value: &Value) -> bool {
    match segments.split_first() {
        None => doc == value,
        Some((head, rest)) => match doc {
            Value::Object(fields) => match fields.get(*head) {
                Some(field) => matches_path(field, rest, value),
                None => false,
            },
            Value::Array(items) => items.iter().any(|item| matches_path(item, segments, value)),
            _ => false,
        },
    }
}
