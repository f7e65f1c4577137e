//! Repositories - per-entity data access over a [`DocumentStore`].
//!
//! [`DocumentStore`]: super::DocumentStore

mod account_repository;
mod mod_repository;

pub use account_repository::AccountRepository;
pub use mod_repository::ModRepository;

use mongodb::bson::{self, Document};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::error;

use super::store::StoreResult;

fn encode<T: Serialize>(record: &T) -> StoreResult<Document> {
    Ok(bson::to_document(record).inspect_err(|e| error!("Failed to encode record: {}", e))?)
}

fn decode<T: DeserializeOwned>(doc: Document) -> StoreResult<T> {
    Ok(bson::from_document(doc).inspect_err(|e| error!("Failed to decode record: {}", e))?)
}
