//! Document store seam.
//!
//! The entity stores only need a handful of primitives from their backend.
//! Any store offering them is substitutable: MongoDB in production, the
//! in-memory collection for tests and local runs.

use async_trait::async_trait;
use mongodb::bson::{self, Document};
use thiserror::Error;

use super::filter::{Filter, FilterError};

/// Transport-level faults. Conflicts and absences are not errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("failed to encode record: {0}")]
    Encode(#[from] bson::ser::Error),

    #[error("failed to decode record: {0}")]
    Decode(#[from] bson::de::Error),

    #[error("invalid filter: {0}")]
    Filter(#[from] FilterError),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Primitives of a document-style collection.
///
/// Each call is atomic on its own. Sequences of calls are not.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert_one(&self, doc: Document) -> StoreResult<()>;

    async fn insert_many(&self, docs: Vec<Document>) -> StoreResult<()>;

    async fn find_one(&self, filter: &Filter) -> StoreResult<Option<Document>>;

    async fn find(&self, filter: &Filter) -> StoreResult<Vec<Document>>;

    /// Set the given fields on the first matching document.
    /// Returns the number of documents matched (0 or 1).
    async fn update_one(&self, filter: &Filter, set: Document) -> StoreResult<u64>;

    /// Returns the number of documents deleted (0 or 1).
    async fn delete_one(&self, filter: &Filter) -> StoreResult<u64>;

    async fn delete_many(&self, filter: &Filter) -> StoreResult<u64>;

    async fn count(&self, filter: &Filter) -> StoreResult<u64>;
}
