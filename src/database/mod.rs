//! Database module exports.

mod filter;
mod memory;
mod models;
mod mongo;
mod repository;
mod store;

pub use filter::{Filter, FilterError};
pub use memory::MemoryCollection;
pub use models::*;
pub use mongo::{Database, MongoCollection};
pub use repository::{AccountRepository, ModRepository};
pub use store::{DocumentStore, StoreError, StoreResult};

/// Collection holding [`Account`] records.
pub const ACCOUNTS_COLLECTION: &str = "accounts";

/// Collection holding [`Mod`] records.
pub const MODS_COLLECTION: &str = "mods";
