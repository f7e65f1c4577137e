//! Mod repository with an optional lookup cache.
//!
//! Mod names are unique under case-insensitive comparison. As with
//! accounts, existence checks and the writes that follow them are separate
//! store calls and can interleave with other callers.

use std::sync::Arc;

use chrono::Local;
use tracing::{info, warn};

use super::{decode, encode};
use crate::cache::{CacheConfig, RecordCache};
use crate::database::filter::Filter;
use crate::database::models::{Comment, Mod};
use crate::database::store::{DocumentStore, StoreResult};

/// Repository for mods.
pub struct ModRepository {
    collection: Arc<dyn DocumentStore>,
    cache: Option<RecordCache<Mod>>,
}

impl ModRepository {
    /// Create a repository that caches `find` results.
    pub fn new(collection: Arc<dyn DocumentStore>, cache: &CacheConfig) -> Self {
        Self {
            collection,
            cache: Some(RecordCache::new("mods_by_name", cache)),
        }
    }

    /// Create a repository without caching.
    pub fn new_no_cache(collection: Arc<dyn DocumentStore>) -> Self {
        Self {
            collection,
            cache: None,
        }
    }

    fn by_name(mod_name: &str) -> Filter {
        Filter::new().eq("modName", mod_name)
    }

    fn invalidate(&self, mod_name: &str) {
        if let Some(cache) = &self.cache {
            cache.invalidate(mod_name);
        }
    }

    /// Insert a mod. `false` if the name collides, ignoring case.
    pub async fn insert(&self, m: &Mod) -> StoreResult<bool> {
        let filter = Filter::name_ci("modName", &m.mod_name)?;
        if let Some(existing) = self.collection.find_one(&filter).await? {
            let existing: Mod = decode(existing)?;
            warn!("Mod [{}] already exists", existing.mod_name);
            return Ok(false);
        }

        self.collection.insert_one(encode(m)?).await?;
        self.invalidate(&m.mod_name);
        info!("Mod [{}] created", m.mod_name);
        Ok(true)
    }

    /// Insert `Dummy Mod 0..count` followed by `Mod1`.
    ///
    /// `None` for a zero count; otherwise `true` only if every insert went through.
    pub async fn insert_dummy_mods(&self, count: usize) -> StoreResult<Option<bool>> {
        if count == 0 {
            return Ok(None);
        }

        let mut all_unique = true;
        for i in 0..count {
            let dummy = dummy_mod(format!("Dummy Mod {i}"))
                .with_tags(["Dummy Tag1", "Dummy Tag2", "Dummy Tag3"]);
            all_unique &= self.insert(&dummy).await?;
        }

        let mod1 = dummy_mod("Mod1").with_tags(["Good Tag1", "Dummy Tag2", "Goofy Tag3"]);
        all_unique &= self.insert(&mod1).await?;

        Ok(Some(all_unique))
    }

    /// Insert the `Default Mod` placeholder, dated today.
    pub async fn insert_default(&self) -> StoreResult<bool> {
        let today = Local::now().format("%Y/%m/%d").to_string();
        let mut m = dummy_mod("Default Mod").with_tags(["Default Tag"]);
        m.author = "Default Author".into();
        m.desc = "Default Description".into();
        m.date_created = today.clone();
        m.date_modified = today;
        m.url = "https://www.google.com".into();
        m.game_name = "Default Game".into();
        m.icon = "Default Icon".into();
        self.insert(&m).await
    }

    /// Find a mod by exact name, through the cache when enabled.
    pub async fn find(&self, mod_name: &str) -> StoreResult<Option<Mod>> {
        let epoch = match &self.cache {
            Some(cache) => {
                if let Some(m) = cache.get(mod_name) {
                    return Ok(Some(m));
                }
                Some(cache.epoch())
            }
            None => None,
        };

        let found = self.find_uncached(mod_name).await?;
        if let (Some(cache), Some(epoch), Some(m)) = (&self.cache, epoch, &found) {
            cache.insert_if_current(mod_name, m.clone(), epoch);
        }
        Ok(found)
    }

    /// Find a mod by exact name straight from the store.
    ///
    /// Read-modify-write callers use this so they never start from a cached copy.
    pub async fn find_uncached(&self, mod_name: &str) -> StoreResult<Option<Mod>> {
        let Some(doc) = self.collection.find_one(&Self::by_name(mod_name)).await? else {
            warn!("Mod [{}] not found", mod_name);
            return Ok(None);
        };

        let m: Mod = decode(doc)?;
        info!("Mod [{}] found", mod_name);
        Ok(Some(m))
    }

    /// All mods matching the filter, possibly none.
    pub async fn search(&self, filter: &Filter) -> StoreResult<Vec<Mod>> {
        let mods = self
            .collection
            .find(filter)
            .await?
            .into_iter()
            .map(decode)
            .collect::<StoreResult<Vec<Mod>>>()?;

        if mods.is_empty() {
            warn!("No mods found with filter: {}", filter);
        } else {
            info!("{} mod(s) found with filter: {}", mods.len(), filter);
        }
        Ok(mods)
    }

    pub async fn get_all(&self) -> StoreResult<Vec<Mod>> {
        self.search(&Filter::new()).await
    }

    pub async fn count(&self) -> StoreResult<u64> {
        self.collection.count(&Filter::new()).await
    }

    /// Mods carrying every one of `tags`.
    pub async fn search_by_tags<S: AsRef<str>>(&self, tags: &[S]) -> StoreResult<Vec<Mod>> {
        let mods = self.get_all().await?;
        Ok(mods
            .into_iter()
            .filter(|m| tags.iter().all(|t| m.tags.iter().any(|own| own == t.as_ref())))
            .collect())
    }

    /// Distinct tags over all mods, in first-seen order.
    pub async fn all_tags(&self) -> StoreResult<Vec<String>> {
        let mut tags: Vec<String> = Vec::new();
        for m in self.get_all().await? {
            for tag in m.tags {
                if !tags.contains(&tag) {
                    tags.push(tag);
                }
            }
        }
        Ok(tags)
    }

    /// Delete a mod. `false` if it does not exist.
    pub async fn remove(&self, mod_name: &str) -> StoreResult<bool> {
        let filter = Self::by_name(mod_name);
        if self.collection.find_one(&filter).await?.is_none() {
            warn!("Mod [{}] does not exist", mod_name);
            return Ok(false);
        }

        self.collection.delete_one(&filter).await?;
        self.invalidate(mod_name);
        info!("Mod [{}] deleted", mod_name);
        Ok(true)
    }

    /// Delete every mod. `false` if the store was already empty.
    pub async fn remove_all(&self) -> StoreResult<bool> {
        let all = Filter::new();
        if self.collection.find_one(&all).await?.is_none() {
            warn!("Mods store is empty so no mods are deleted");
            return Ok(false);
        }

        let deleted = self.collection.delete_many(&all).await?;
        if let Some(cache) = &self.cache {
            cache.invalidate_all();
        }
        info!("All {} mods deleted", deleted);
        Ok(true)
    }

    /// Overwrite the mod stored under `mod_name` with every field of `new_mod`.
    ///
    /// Passes when the name is unchanged, or when `mod_name` exists and no
    /// other mod holds `new_mod.mod_name` ignoring case.
    pub async fn update(&self, mod_name: &str, new_mod: &Mod) -> StoreResult<bool> {
        let filter = Self::by_name(mod_name);

        if mod_name != new_mod.mod_name {
            let exists = self.collection.find_one(&filter).await?.is_some();
            let taken = self
                .collection
                .find(&Filter::name_ci("modName", &new_mod.mod_name)?)
                .await?
                .into_iter()
                .any(|doc| doc.get_str("modName").map_or(true, |name| name != mod_name));

            if !exists || taken {
                warn!(
                    "Mod [{}] does not exist or new mod name [{}] already exists",
                    mod_name, new_mod.mod_name
                );
                return Ok(false);
            }
        }

        self.collection.update_one(&filter, encode(new_mod)?).await?;
        self.invalidate(mod_name);
        self.invalidate(&new_mod.mod_name);
        info!("Mod [{}] updated", mod_name);
        Ok(true)
    }
}

fn dummy_mod(name: impl Into<String>) -> Mod {
    let mut m = Mod::new(name, "Dummy Author");
    m.desc = "Dummy Description".into();
    m.date_created = "Dummy Date Created".into();
    m.date_modified = "Dummy Date Modified".into();
    m.url = "Dummy URL".into();
    m.game_name = "Dummy Game Name".into();
    m.icon = "Dummy Icon".into();
    m.slug = "Default Slug".into();
    m.comments = (1..=3)
        .map(|i| Comment::new(format!("Dummy User{i}"), format!("Dummy Comment{i}")))
        .collect();
    m
}
