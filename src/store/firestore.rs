use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use firestore::{FirestoreDb, FirestoreResult};
use futures::{stream::BoxStream, StreamExt, TryStreamExt};
use serde_json::Value;

use crate::Status;

use super::{DocumentStore, Filter};

/// Firestore-backed `DocumentStore`.
pub struct FirestoreStore {
    db: FirestoreDb,
    insert_counter: AtomicU32,
}

impl FirestoreStore {
    pub async fn connect(project_id: &str) -> Result<Self, Status> {
        Ok(FirestoreStore {
            db: FirestoreDb::new(project_id).await?,
            insert_counter: AtomicU32::new(0),
        })
    }

    pub fn db(&self) -> &FirestoreDb {
        &self.db
    }

    // Time-ordered unique document id, in the spirit of Mongo object ids.
    fn next_doc_id(&self) -> String {
        let count = self.insert_counter.fetch_add(1, Ordering::Relaxed);
        format!("{:x}{:08x}", Utc::now().timestamp_millis(), count)
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn insert_one(&self, collection: &str, mut doc: Value) -> Result<Value, Status> {
        let doc_id = self.next_doc_id();
        set_id(&mut doc, &doc_id)?;

        // A freshly generated id makes the upsert-style write a create.
        self.db
            .fluent()
            .update()
            .in_col(collection)
            .document_id(&doc_id)
            .object(&doc)
            .execute::<()>()
            .await?;
        Ok(doc)
    }

    async fn find_one(&self, collection: &str, filter: Filter) -> Result<Option<Value>, Status> {
        Ok(self.find(collection, filter).await?.into_iter().next())
    }

    async fn find(&self, collection: &str, filter: Filter) -> Result<Vec<Value>, Status> {
        match filter {
            Filter::All => {
                let doc_stream: BoxStream<Value> = self
                    .db
                    .fluent()
                    .list()
                    .from(collection)
                    .obj()
                    .stream_all()
                    .await?;

                Ok(doc_stream.collect().await)
            }
            Filter::Eq { field, value } => {
                let doc_stream: BoxStream<FirestoreResult<Value>> = self
                    .db
                    .fluent()
                    .select()
                    .from(collection)
                    .filter(|q| q.for_all([q.field(field.clone()).equal(value.clone())]))
                    .obj()
                    .stream_query_with_errors()
                    .await?;

                Ok(doc_stream.try_collect().await?)
            }
        }
    }

    async fn replace_one(
        &self,
        collection: &str,
        doc_id: &str,
        mut doc: Value,
    ) -> Result<Value, Status> {
        let existing: Option<Value> = self
            .db
            .fluent()
            .select()
            .by_id_in(collection)
            .obj()
            .one(doc_id.to_string())
            .await?;
        if existing.is_none() {
            return Err(Status::not_found(format!(
                "Firestore document '{collection}/{doc_id}' was not found"
            )));
        }

        set_id(&mut doc, doc_id)?;
        self.db
            .fluent()
            .update()
            .in_col(collection)
            .document_id(doc_id)
            .object(&doc)
            .execute::<()>()
            .await?;
        Ok(doc)
    }

    async fn delete_one(&self, collection: &str, doc_id: &str) -> Result<(), Status> {
        self.db
            .fluent()
            .delete()
            .from(collection)
            .document_id(doc_id)
            .execute()
            .await?;
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
