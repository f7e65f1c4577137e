//! Configuration module for Modhub.
//!
//! Loads configuration from environment variables.

use std::env;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::cache::CacheConfig;

/// Which document store backs the catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StorageBackend {
    #[default]
    Mongo,
    Memory,
}

impl StorageBackend {
    fn parse(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(Self::Mongo),
            "memory" => Ok(Self::Memory),
            other => bail!("unknown STORAGE_BACKEND '{other}' (expected mongo or memory)"),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub backend: StorageBackend,

    // MongoDB
    pub mongodb_uri: String,
    pub mongodb_database: String,

    /// Mod lookup cache; `None` when disabled.
    pub mod_cache: Option<CacheConfig>,

    /// Seed dummy accounts and mods at start-up.
    pub seed_dummy_data: bool,
    pub seed_dummy_mods: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            mongodb_uri: "mongodb://localhost:27017".to_string(),
            mongodb_database: "modhub".to_string(),
            mod_cache: Some(CacheConfig::default()),
            seed_dummy_data: false,
            seed_dummy_mods: 5,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let backend = match lookup("STORAGE_BACKEND") {
            Some(value) => StorageBackend::parse(&value)?,
            None => defaults.backend,
        };

        let cache_ttl_secs = match lookup("MOD_CACHE_TTL_SECS") {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .with_context(|| format!("invalid MOD_CACHE_TTL_SECS '{value}'"))?,
            None => CacheConfig::default().ttl.as_secs(),
        };
        let mod_cache = (cache_ttl_secs > 0)
            .then(|| CacheConfig::with_ttl(Duration::from_secs(cache_ttl_secs)));

        let seed_dummy_data = lookup("SEED_DUMMY_DATA")
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(defaults.seed_dummy_data);

        let seed_dummy_mods = match lookup("SEED_DUMMY_MODS") {
            Some(value) => value
                .trim()
                .parse::<usize>()
                .with_context(|| format!("invalid SEED_DUMMY_MODS '{value}'"))?,
            None => defaults.seed_dummy_mods,
        };

        Ok(Self {
            backend,
            mongodb_uri: lookup("MONGODB_URI").unwrap_or(defaults.mongodb_uri),
            mongodb_database: lookup("MONGODB_DATABASE").unwrap_or(defaults.mongodb_database),
            mod_cache,
            seed_dummy_data,
            seed_dummy_mods,
        })
    }
}
