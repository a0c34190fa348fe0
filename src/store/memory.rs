use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Mutex,
    },
};

use async_trait::async_trait;
use serde_json::Value;

use crate::Status;

use super::{DocumentStore, Filter};

/// In-memory `DocumentStore` backing the test suite and local tooling.
/// Collections are plain vectors behind a mutex that is never held across an
/// await.
pub struct MemoryStore {
    collections: Mutex<HashMap<String, Vec<Value>>>,
    next_id: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore {
            collections: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        MemoryStore::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert_one(&self, collection: &str, mut doc: Value) -> Result<Value, Status> {
        let doc_id = self.next_id.fetch_add(1, Ordering::Relaxed).to_string();
        set_id(&mut doc, &doc_id)?;

        let mut collections = self.collections.lock().unwrap();
        collections
            .entry(collection.to_owned())
            .or_default()
            .push(doc.clone());
        Ok(doc)
    }

    async fn find_one(&self, collection: &str, filter: Filter) -> Result<Option<Value>, Status> {
        let collections = self.collections.lock().unwrap();
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|doc| filter.matches(doc)).cloned()))
    }

    async fn find(&self, collection: &str, filter: Filter) -> Result<Vec<Value>, Status> {
        let collections = self.collections.lock().unwrap();
        Ok(match collections.get(collection) {
            Some(docs) => docs
                .iter()
                .filter(|doc| filter.matches(doc))
                .cloned()
                .collect(),
            None => vec![],
        })
    }

    async fn replace_one(
        &self,
        collection: &str,
        doc_id: &str,
        mut doc: Value,
    ) -> Result<Value, Status> {
        set_id(&mut doc, doc_id)?;

        let mut collections = self.collections.lock().unwrap();
        let docs = collections.entry(collection.to_owned()).or_default();
        match docs.iter_mut().find(|doc| doc["id"] == doc_id) {
            Some(existing) => {
                *existing = doc.clone();
                Ok(doc)
            }
            None => Err(Status::not_found(format!(
                "Document '{collection}/{doc_id}' was not found"
            ))),
        }
    }

    async fn delete_one(&self, collection: &str, doc_id: &str) -> Result<(), Status> {
        let mut collections = self.collections.lock().unwrap();
        if let Some(docs) = collections.get_mut(collection) {
            docs.retain(|doc| doc["id"] != doc_id);
        }
        Ok(())
    }
}

fn set_id(doc: &mut Value, doc_id: &str) -> Result<(), Status> {
    match doc.as_object_mut() {
        Some(fields) => {
            fields.insert("id".to_owned(), Value::from(doc_id));
            Ok(())
        }
        None => Err(Status::invalid_argument(
            "Store documents must be JSON objects",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn insert_assigns_unique_ids() {
        let store = MemoryStore::new();

        let first = store.insert_one("games", json!({"slug": "a"})).await.unwrap();
        let second = store.insert_one("games", json!({"slug": "b"})).await.unwrap();

        assert_ne!(first["id"], second["id"]);
        assert_eq!(store.find("games", Filter::All).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn collections_are_independent() {
        let store = MemoryStore::new();

        store.insert_one("games", json!({"slug": "a"})).await.unwrap();

        assert!(store.find("platforms", Filter::All).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn replace_requires_an_existing_document() {
        let store = MemoryStore::new();

        let doc = store.insert_one("games", json!({"slug": "a"})).await.unwrap();
        let doc_id = doc["id"].as_str().unwrap();

        let replaced = store
            .replace_one("games", doc_id, json!({"slug": "b"}))
            .await
            .unwrap();
        assert_eq!(replaced["id"], doc["id"]);

        let missing = store
            .replace_one("games", "no-such-id", json!({"slug": "c"}))
            .await;
        assert!(matches!(missing, Err(Status::NotFound(_))));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = MemoryStore::new();

        let doc = store.insert_one("games", json!({"slug": "a"})).await.unwrap();
        let doc_id = doc["id"].as_str().unwrap().to_owned();

        store.delete_one("games", &doc_id).await.unwrap();
        store.delete_one("games", &doc_id).await.unwrap();

        assert!(store.find("games", Filter::All).await.unwrap().is_empty());
    }
}
