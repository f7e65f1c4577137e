//! Catalog wiring.
//!
//! Opens the configured backend and hands out the stores built on it.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::cache::CacheConfig;
use crate::config::{Config, StorageBackend};
use crate::database::{
    AccountRepository, Database, DocumentStore, MemoryCollection, ModRepository, StoreResult,
    ACCOUNTS_COLLECTION, MODS_COLLECTION,
};
use crate::services::EngagementService;

/// Counts reported after start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSummary {
    pub accounts: u64,
    pub mods: u64,
    pub tags: Vec<String>,
}

/// Account and mod stores sharing one backend.
#[derive(Clone)]
pub struct Catalog {
    pub accounts: AccountRepository,
    pub mods: Arc<ModRepository>,
    pub engagement: EngagementService,
    database: Option<Database>,
}

impl Catalog {
    /// Open the backend selected by `config`.
    pub async fn open(config: &Config) -> Result<Self> {
        match config.backend {
            StorageBackend::Mongo => {
                info!("Connecting to MongoDB...");
                let db = Database::connect(&config.mongodb_uri, &config.mongodb_database).await?;
                let accounts = Arc::new(db.collection(ACCOUNTS_COLLECTION));
                let mods = Arc::new(db.collection(MODS_COLLECTION));
                Ok(Self::build(accounts, mods, config.mod_cache.as_ref(), Some(db)))
            }
            StorageBackend::Memory => {
                info!("Using in-memory storage");
                Ok(Self::in_memory(config.mod_cache.as_ref()))
            }
        }
    }

    /// Catalog over fresh in-memory collections.
    pub fn in_memory(cache: Option<&CacheConfig>) -> Self {
        Self::build(
            Arc::new(MemoryCollection::new(ACCOUNTS_COLLECTION)),
            Arc::new(MemoryCollection::new(MODS_COLLECTION)),
            cache,
            None,
        )
    }

    fn build(
        accounts: Arc<dyn DocumentStore>,
        mods: Arc<dyn DocumentStore>,
        cache: Option<&CacheConfig>,
        database: Option<Database>,
    ) -> Self {
        let mods = Arc::new(match cache {
            Some(config) => ModRepository::new(mods, config),
            None => ModRepository::new_no_cache(mods),
        });

        Self {
            accounts: AccountRepository::new(accounts),
            engagement: EngagementService::new(Arc::clone(&mods)),
            mods,
            database,
        }
    }

    /// Insert dummy accounts and `mod_count` dummy mods.
    pub async fn seed(&self, mod_count: usize) -> StoreResult<()> {
        self.accounts.insert_dummy_accounts().await?;
        self.mods.insert_default().await?;
        if let Some(all_unique) = self.mods.insert_dummy_mods(mod_count).await? {
            info!("Dummy mods seeded (all unique: {})", all_unique);
        }
        Ok(())
    }

    pub async fn summary(&self) -> StoreResult<CatalogSummary> {
        Ok(CatalogSummary {
            accounts: self.accounts.count().await?,
            mods: self.mods.count().await?,
            tags: self.mods.all_tags().await?,
        })
    }

    /// Release the backend connection, if any.
    pub async fn close(self) {
        if let Some(db) = self.database {
            db.close().await;
        }
    }
}
