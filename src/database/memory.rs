//! In-memory document collection.
//!
//! Keeps documents in insertion order and evaluates filters with the
//! shared filter engine. Every primitive holds the lock for its whole
//! duration; nothing spans two primitives.

use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Document};
use parking_lot::RwLock;
use tracing::debug;

use super::filter::Filter;
use super::store::{DocumentStore, StoreResult};

/// Collection living in process memory.
#[derive(Debug, Default)]
pub struct MemoryCollection {
    name: String,
    docs: RwLock<Vec<Document>>,
}

impl MemoryCollection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            docs: RwLock::new(Vec::new()),
        }
    }

    fn with_id(mut doc: Document) -> Document {
        if !doc.contains_key("_id") {
            doc.insert("_id", ObjectId::new());
        }
        doc
    }
}

#[async_trait]
impl DocumentStore for MemoryCollection {
    async fn insert_one(&self, doc: Document) -> StoreResult<()> {
        self.docs.write().push(Self::with_id(doc));
        Ok(())
    }

    async fn insert_many(&self, docs: Vec<Document>) -> StoreResult<()> {
        let mut stored = self.docs.write();
        stored.extend(docs.into_iter().map(Self::with_id));
        Ok(())
    }

    async fn find_one(&self, filter: &Filter) -> StoreResult<Option<Document>> {
        Ok(self.docs.read().iter().find(|d| filter.matches(d)).cloned())
    }

    async fn find(&self, filter: &Filter) -> StoreResult<Vec<Document>> {
        Ok(self
            .docs
            .read()
            .iter()
            .filter(|d| filter.matches(d))
            .cloned()
            .collect())
    }

    async fn update_one(&self, filter: &Filter, set: Document) -> StoreResult<u64> {
        let mut stored = self.docs.write();
        let Some(doc) = stored.iter_mut().find(|d| filter.matches(d)) else {
            return Ok(0);
        };
        for (key, value) in set {
            if key != "_id" {
                doc.insert(key, value);
            }
        }
        Ok(1)
    }

    async fn delete_one(&self, filter: &Filter) -> StoreResult<u64> {
        let mut stored = self.docs.write();
        match stored.iter().position(|d| filter.matches(d)) {
            Some(idx) => {
                stored.remove(idx);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_many(&self, filter: &Filter) -> StoreResult<u64> {
        let mut stored = self.docs.write();
        let before = stored.len();
        stored.retain(|d| !filter.matches(d));
        let deleted = (before - stored.len()) as u64;
        debug!("Deleted {} document(s) from memory collection {}", deleted, self.name);
        Ok(deleted)
    }

    async fn count(&self, filter: &Filter) -> StoreResult<u64> {
        Ok(self.docs.read().iter().filter(|d| filter.matches(d)).count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    #[tokio::test]
    async fn test_insert_assigns_id_and_keeps_order() {
        let coll = MemoryCollection::new("things");
        coll.insert_one(doc! { "n": 1 }).await.unwrap();
        coll.insert_many(vec![doc! { "n": 2 }, doc! { "n": 3 }]).await.unwrap();

        let all = coll.find(&Filter::new()).await.unwrap();
        let ns: Vec<i32> = all.iter().map(|d| d.get_i32("n").unwrap()).collect();
        assert_eq!(ns, vec![1, 2, 3]);
        assert!(all.iter().all(|d| d.get_object_id("_id").is_ok()));
    }

    #[tokio::test]
    async fn test_update_one_sets_fields_and_keeps_id() {
        let coll = MemoryCollection::new("things");
        coll.insert_one(doc! { "n": 1, "s": "a" }).await.unwrap();
        let before = coll.find_one(&Filter::new()).await.unwrap().unwrap();

        let matched = coll
            .update_one(&Filter::new().eq("n", 1), doc! { "s": "b", "_id": ObjectId::new() })
            .await
            .unwrap();
        assert_eq!(matched, 1);

        let after = coll.find_one(&Filter::new()).await.unwrap().unwrap();
        assert_eq!(after.get_str("s").unwrap(), "b");
        assert_eq!(
            after.get_object_id("_id").unwrap(),
            before.get_object_id("_id").unwrap()
        );

        let missed = coll
            .update_one(&Filter::new().eq("n", 9), doc! { "s": "c" })
            .await
            .unwrap();
        assert_eq!(missed, 0);
    }

    #[tokio::test]
    async fn test_delete_one_removes_first_match_only() {
        let coll = MemoryCollection::new("things");
        coll.insert_many(vec![doc! { "k": "x", "n": 1 }, doc! { "k": "x", "n": 2 }])
            .await
            .unwrap();

        assert_eq!(coll.delete_one(&Filter::new().eq("k", "x")).await.unwrap(), 1);
        let left = coll.find(&Filter::new()).await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].get_i32("n").unwrap(), 2);
    }

    #[tokio::test]
    async fn test_delete_many_and_count() {
        let coll = MemoryCollection::new("things");
        coll.insert_many(vec![doc! { "k": "x" }, doc! { "k": "y" }, doc! { "k": "x" }])
            .await
            .unwrap();

        assert_eq!(coll.count(&Filter::new().eq("k", "x")).await.unwrap(), 2);
        assert_eq!(coll.delete_many(&Filter::new()).await.unwrap(), 3);
        assert_eq!(coll.count(&Filter::new()).await.unwrap(), 0);
    }
}
