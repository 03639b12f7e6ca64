use std::sync::Arc;

use bson::Document;
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::data::filter;
use crate::error::StoreError;

pub mod memory;
pub mod mongo;

pub use memory::MemoryStore;

/// Document store the managers persist through.
///
/// Filters use equality and `$in`; sort documents map fields to `1`/`-1`.
/// Every write touches a single document.
#[rocket::async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find(
        &self,
        collection: &str,
        filter: Document,
        sort: Option<Document>,
    ) -> Result<Vec<Document>, StoreError>;

    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<Option<Document>, StoreError>;

    async fn insert_one(&self, collection: &str, document: Document) -> Result<(), StoreError>;

    /// Returns whether a document matched the filter.
    async fn replace_one(
        &self,
        collection: &str,
        filter: Document,
        document: Document,
    ) -> Result<bool, StoreError>;
}

pub type Store = Arc<dyn DocumentStore>;

/// A typed document living in its own collection.
pub trait Record: Serialize + DeserializeOwned + Send + Sync + 'static {
    const COLLECTION: &'static str;

    fn id(&self) -> Uuid;
}

impl dyn DocumentStore {
    pub async fn find_records<T: Record>(
        &self,
        filter: Document,
        sort: Option<Document>,
    ) -> Result<Vec<T>, StoreError> {
        self.find(T::COLLECTION, filter, sort)
            .await?
            .into_iter()
            .map(|document| bson::from_document(document).map_err(StoreError::from))
            .collect()
    }

    pub async fn find_record<T: Record>(&self, filter: Document) -> Result<Option<T>, StoreError> {
        match self.find_one(T::COLLECTION, filter).await? {
            Some(document) => Ok(Some(bson::from_document(document)?)),
            None => Ok(None),
        }
    }

    pub async fn insert_record<T: Record>(&self, record: &T) -> Result<(), StoreError> {
        let document = bson::to_document(record)?;
        self.insert_one(T::COLLECTION, document).await
    }

    /// Replaces the stored document with the same id.
    pub async fn save_record<T: Record>(&self, record: &T) -> Result<bool, StoreError> {
        let document = bson::to_document(record)?;
        self.replace_one(T::COLLECTION, filter::by_id(record.id()), document)
            .await
    }
}
