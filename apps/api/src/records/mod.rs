//! Record store: the insert/fetch boundary for postings and profiles.
//!
//! `AppState` holds an `Arc<dyn RecordStore>`: PostgreSQL when `DATABASE_URL` is set,
//! otherwise an in-process store.

pub mod handlers;
pub mod postgres;

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::models::records::{Collection, RawRecord};

pub use postgres::PgRecordStore;

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Inserts one record. At-most-once: no dedup, no update.
    async fn insert(&self, collection: Collection, record: RawRecord) -> Result<()>;

    /// Returns every record in the collection, in the store's traversal order.
    async fn fetch_all(&self, collection: Collection) -> Result<Vec<RawRecord>>;
}

/// Keeps records in insertion order for the lifetime of the process.
#[derive(Default)]
pub struct MemoryRecordStore {
    collections: RwLock<HashMap<Collection, Vec<RawRecord>>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn insert(&self, collection: Collection, record: RawRecord) -> Result<()> {
        let mut collections = self.collections.write().await;
        collections.entry(collection).or_default().push(record);
        Ok(())
    }

    async fn fetch_all(&self, collection: Collection) -> Result<Vec<RawRecord>> {
        let collections = self.collections.read().await;
        Ok(collections.get(&collection).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> RawRecord {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_memory_store_preserves_insertion_order() {
        let store = MemoryRecordStore::new();
        store
            .insert(Collection::Postings, record(json!({"title": "first"})))
            .await
            .unwrap();
        store
            .insert(Collection::Postings, record(json!({"title": "second"})))
            .await
            .unwrap();

        let postings = store.fetch_all(Collection::Postings).await.unwrap();
        assert_eq!(postings.len(), 2);
        assert_eq!(postings[0]["title"], "first");
        assert_eq!(postings[1]["title"], "second");
    }

    #[tokio::test]
    async fn test_memory_store_keeps_collections_apart() {
        let store = MemoryRecordStore::new();
        store
            .insert(Collection::Profiles, record(json!({"name": "Ada"})))
            .await
            .unwrap();

        assert!(store.fetch_all(Collection::Postings).await.unwrap().is_empty());
        assert_eq!(store.fetch_all(Collection::Profiles).await.unwrap().len(), 1);
    }
}
