use std::cmp::Ordering;
use std::collections::HashMap;

use bson::{Bson, Document};
use tokio::sync::RwLock;

use super::DocumentStore;
use crate::error::StoreError;

/// In-process document store evaluating the same filter subset as the
/// MongoDB backend: field equality and `{ "$in": [...] }`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }
}

fn field_matches(value: Option<&Bson>, condition: &Bson) -> bool {
    match condition {
        Bson::Document(operators)
            if !operators.is_empty() && operators.keys().all(|k| k.starts_with('$')) =>
        {
            operators.iter().all(|(op, arg)| match (op.as_str(), arg) {
                ("$in", Bson::Array(options)) => {
                    value.map_or(false, |value| options.contains(value))
                }
                ("$ne", expected) => value != Some(expected),
                _ => false,
            })
        }
        expected => value == Some(expected),
    }
}

fn matches(document: &Document, filter: &Document) -> bool {
    filter
        .iter()
        .all(|(field, condition)| field_matches(document.get(field), condition))
}

fn compare_bson(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
    match (a, b) {
        (Some(Bson::DateTime(a)), Some(Bson::DateTime(b))) => a.cmp(b),
        (Some(Bson::String(a)), Some(Bson::String(b))) => a.cmp(b),
        (Some(Bson::Int32(a)), Some(Bson::Int32(b))) => a.cmp(b),
        (Some(Bson::Int64(a)), Some(Bson::Int64(b))) => a.cmp(b),
        (Some(Bson::Double(a)), Some(Bson::Double(b))) => {
            a.partial_cmp(b).unwrap_or(Ordering::Equal)
        }
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

fn sort_documents(documents: &mut [Document], sort: &Document) {
    documents.sort_by(|a, b| {
        sort.iter()
            .map(|(field, direction)| {
                let ordering = compare_bson(a.get(field), b.get(field));
                let descending = matches!(direction, Bson::Int32(d) if *d < 0)
                    || matches!(direction, Bson::Int64(d) if *d < 0);
                if descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            })
            .find(|ordering| *ordering != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });
}

#[rocket::async_trait]
impl DocumentStore for MemoryStore {
    async fn find(
        &self,
        collection: &str,
        filter: Document,
        sort: Option<Document>,
    ) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().await;
        let mut found: Vec<Document> = collections
            .get(collection)
            .map(|documents| {
                documents
                    .iter()
                    .filter(|document| matches(document, &filter))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(sort) = sort {
            sort_documents(&mut found, &sort);
        }

        Ok(found)
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections.get(collection).and_then(|documents| {
            documents
                .iter()
                .find(|document| matches(document, &filter))
                .cloned()
        }))
    }

    async fn insert_one(&self, collection: &str, document: Document) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let documents = collections.entry(collection.to_string()).or_default();

        if let Some(id) = document.get("_id") {
            if documents.iter().any(|it| it.get("_id") == Some(id)) {
                return Err(StoreError::Duplicate);
            }
        }

        documents.push(document);
        Ok(())
    }

    async fn replace_one(
        &self,
        collection: &str,
        filter: Document,
        document: Document,
    ) -> Result<bool, StoreError> {
        let mut collections = self.collections.write().await;
        let target = collections.get_mut(collection).and_then(|documents| {
            documents
                .iter_mut()
                .find(|existing| matches(existing, &filter))
        });

        match target {
            Some(existing) => {
                *existing = document;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[rocket::async_test]
    async fn equality_and_in_filters() {
        let store = MemoryStore::new();
        store
            .insert_one("videos", doc! { "_id": 1, "subject": "math", "isActive": true })
            .await
            .unwrap();
        store
            .insert_one("videos", doc! { "_id": 2, "subject": "bio", "isActive": true })
            .await
            .unwrap();
        store
            .insert_one("videos", doc! { "_id": 3, "subject": "math", "isActive": false })
            .await
            .unwrap();

        let found = store
            .find(
                "videos",
                doc! { "subject": { "$in": ["math", "physics"] }, "isActive": true },
                None,
            )
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].get_i32("_id").unwrap(), 1);

        let none = store
            .find("videos", doc! { "subject": { "$in": [] } }, None)
            .await
            .unwrap();
        assert!(none.is_empty());

        let missing = store.find("lives", doc! {}, None).await.unwrap();
        assert!(missing.is_empty());
    }

    #[rocket::async_test]
    async fn sorts_by_field_direction() {
        let store = MemoryStore::new();
        for (id, at) in [(1, 30i64), (2, 10), (3, 20)] {
            store
                .insert_one(
                    "lives",
                    doc! { "_id": id, "scheduledAt": bson::DateTime::from_millis(at) },
                )
                .await
                .unwrap();
        }

        let ascending = store
            .find("lives", doc! {}, Some(doc! { "scheduledAt": 1 }))
            .await
            .unwrap();
        let ids: Vec<i32> = ascending.iter().map(|d| d.get_i32("_id").unwrap()).collect();
        assert_eq!(ids, vec![2, 3, 1]);

        let descending = store
            .find("lives", doc! {}, Some(doc! { "scheduledAt": -1 }))
            .await
            .unwrap();
        let ids: Vec<i32> = descending.iter().map(|d| d.get_i32("_id").unwrap()).collect();
        assert_eq!(ids, vec![1, 3, 2]);
    }

    #[rocket::async_test]
    async fn replace_and_duplicate_ids() {
        let store = MemoryStore::new();
        store
            .insert_one("users", doc! { "_id": 1, "name": "a" })
            .await
            .unwrap();

        assert!(matches!(
            store.insert_one("users", doc! { "_id": 1 }).await,
            Err(StoreError::Duplicate)
        ));

        let replaced = store
            .replace_one("users", doc! { "_id": 1 }, doc! { "_id": 1, "name": "b" })
            .await
            .unwrap();
        assert!(replaced);

        let missed = store
            .replace_one("users", doc! { "_id": 9 }, doc! { "_id": 9 })
            .await
            .unwrap();
        assert!(!missed);

        let user = store
            .find_one("users", doc! { "_id": 1 })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.get_str("name").unwrap(), "b");
    }
}
