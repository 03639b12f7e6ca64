use bson::{doc, Document};
use mongodb::options::{FindOptions, IndexOptions};
use mongodb::{Database, IndexModel};
use rocket::futures::TryStreamExt;
use tracing_futures::Instrument;

use super::DocumentStore;
use crate::data::user::USER_COLLECTION_NAME;
use crate::error::StoreError;

#[rocket::async_trait]
impl DocumentStore for Database {
    async fn find(
        &self,
        collection: &str,
        filter: Document,
        sort: Option<Document>,
    ) -> Result<Vec<Document>, StoreError> {
        let options = FindOptions::builder().sort(sort).build();
        let span = tracing::debug_span!("mongodb.find", collection);

        let cursor = self
            .collection::<Document>(collection)
            .find(filter, options)
            .instrument(span.clone())
            .await?;

        cursor
            .try_collect()
            .instrument(span)
            .await
            .map_err(StoreError::from)
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<Option<Document>, StoreError> {
        self.collection::<Document>(collection)
            .find_one(filter, None)
            .instrument(tracing::debug_span!("mongodb.find_one", collection))
            .await
            .map_err(StoreError::from)
    }

    async fn insert_one(&self, collection: &str, document: Document) -> Result<(), StoreError> {
        self.collection::<Document>(collection)
            .insert_one(document, None)
            .instrument(tracing::debug_span!("mongodb.insert_one", collection))
            .await
            .map(|_| ())
            .map_err(StoreError::from)
    }

    async fn replace_one(
        &self,
        collection: &str,
        filter: Document,
        document: Document,
    ) -> Result<bool, StoreError> {
        self.collection::<Document>(collection)
            .replace_one(filter, document, None)
            .instrument(tracing::debug_span!("mongodb.replace_one", collection))
            .await
            .map(|result| result.matched_count > 0)
            .map_err(StoreError::from)
    }
}

/// Global email uniqueness is enforced by the database as well as by the managers.
pub async fn ensure_indexes(db: &Database) -> Result<(), StoreError> {
    let unique_email = IndexModel::builder()
        .keys(doc! { "email": 1 })
        .options(IndexOptions::builder().unique(true).build())
        .build();

    db.collection::<Document>(USER_COLLECTION_NAME)
        .create_index(unique_email, None)
        .await?;

    Ok(())
}
