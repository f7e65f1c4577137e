//! Engagement operations on stored mods.
//!
//! Each operation reads the mod, applies one in-memory mutation and writes
//! the full record back under its original name. A missing mod yields
//! `false`. The read and the write are separate store calls, so concurrent
//! bumps of the same mod may lose updates.

use std::sync::Arc;

use tracing::{debug, warn};

use super::tags;
use crate::database::{Mod, ModRepository, StoreResult};

/// Direction of a like change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeChange {
    Add,
    Remove,
}

/// View, like, tag and comment updates.
#[derive(Clone)]
pub struct EngagementService {
    mods: Arc<ModRepository>,
}

impl EngagementService {
    pub fn new(mods: Arc<ModRepository>) -> Self {
        Self { mods }
    }

    async fn modify<F>(&self, mod_name: &str, mutate: F) -> StoreResult<bool>
    where
        F: FnOnce(&mut Mod),
    {
        let Some(mut m) = self.mods.find_uncached(mod_name).await? else {
            warn!("Cannot modify missing mod [{}]", mod_name);
            return Ok(false);
        };

        mutate(&mut m);
        self.mods.update(mod_name, &m).await
    }

    pub async fn record_view(&self, mod_name: &str) -> StoreResult<bool> {
        self.modify(mod_name, |m| {
            m.increment_views();
        })
        .await
    }

    pub async fn change_likes(&self, mod_name: &str, change: LikeChange) -> StoreResult<bool> {
        self.modify(mod_name, |m| {
            match change {
                LikeChange::Add => m.increment_likes(),
                LikeChange::Remove => m.decrement_likes(),
            };
        })
        .await
    }

    /// Apply tag deletes then adds. Renaming is not possible through here.
    pub async fn update_tags<A, D>(&self, mod_name: &str, add: &[A], delete: &[D]) -> StoreResult<bool>
    where
        A: AsRef<str>,
        D: AsRef<str>,
    {
        self.modify(mod_name, |m| {
            m.tags = tags::reconcile(&m.tags, add, delete);
            debug!("Reconciled tags for [{}]: {:?}", m.mod_name, m.tags);
        })
        .await
    }

    pub async fn add_comment(&self, mod_name: &str, username: &str, content: &str) -> StoreResult<bool> {
        self.modify(mod_name, |m| m.add_comment(username, content)).await
    }

    pub async fn clear_comments(&self, mod_name: &str) -> StoreResult<bool> {
        self.modify(mod_name, Mod::clear_comments).await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::cache::CacheConfig;
    use crate::database::{Comment, DocumentStore, Filter, MemoryCollection};

    async fn service_with(m: Mod) -> (EngagementService, Arc<ModRepository>) {
        let mods = Arc::new(ModRepository::new_no_cache(Arc::new(MemoryCollection::new("mods"))));
        assert!(mods.insert(&m).await.unwrap());
        (EngagementService::new(Arc::clone(&mods)), mods)
    }

    #[tokio::test]
    async fn test_record_view() {
        let (service, mods) = service_with(Mod::new("Foo", "alice")).await;
        assert!(service.record_view("Foo").await.unwrap());
        assert!(service.record_view("Foo").await.unwrap());

        assert_eq!(mods.find("Foo").await.unwrap().unwrap().views, 2);
    }

    #[tokio::test]
    async fn test_likes_can_go_negative() {
        let (service, mods) = service_with(Mod::new("Foo", "alice")).await;
        assert!(service.change_likes("Foo", LikeChange::Add).await.unwrap());
        assert!(service.change_likes("Foo", LikeChange::Remove).await.unwrap());
        assert!(service.change_likes("Foo", LikeChange::Remove).await.unwrap());

        assert_eq!(mods.find("Foo").await.unwrap().unwrap().likes, -1);
    }

    #[tokio::test]
    async fn test_update_tags_scenario() {
        let (service, mods) = service_with(Mod::new("Foo", "alice").with_tags(["a", "b"])).await;
        assert!(service.update_tags("Foo", &["c", "a"], &["b"]).await.unwrap());

        let stored = mods.find("Foo").await.unwrap().unwrap();
        assert_eq!(stored.tags, vec!["a", "c"]);
        assert_eq!(stored.author, "alice");
    }

    #[tokio::test]
    async fn test_missing_mod_is_false() {
        let (service, mods) = service_with(Mod::new("Foo", "alice")).await;
        assert!(!service.record_view("Bar").await.unwrap());
        assert!(!service.update_tags("Bar", &["x"], &["y"]).await.unwrap());
        assert!(!service.change_likes("Bar", LikeChange::Add).await.unwrap());
        assert_eq!(mods.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_comments() {
        let (service, mods) = service_with(Mod::new("Foo", "alice")).await;
        assert!(service.add_comment("Foo", "bob", "nice").await.unwrap());
        assert!(service.add_comment("Foo", "eve", "meh").await.unwrap());

        let stored = mods.find("Foo").await.unwrap().unwrap();
        assert_eq!(
            stored.comments,
            vec![Comment::new("bob", "nice"), Comment::new("eve", "meh")]
        );

        assert!(service.clear_comments("Foo").await.unwrap());
        assert!(mods.find("Foo").await.unwrap().unwrap().comments.is_empty());
    }

    #[tokio::test]
    async fn test_modify_starts_from_stored_record() {
        let store = Arc::new(MemoryCollection::new("mods"));
        let mods = Arc::new(ModRepository::new(
            Arc::clone(&store) as Arc<dyn DocumentStore>,
            &CacheConfig::with_ttl(Duration::from_secs(60)),
        ));
        mods.insert(&Mod::new("Foo", "alice")).await.unwrap();
        mods.find("Foo").await.unwrap();

        let mut newer = Mod::new("Foo", "bob");
        newer.likes = 5;
        let newer = mongodb::bson::to_document(&newer).unwrap();
        store
            .update_one(&Filter::new().eq("modName", "Foo"), newer)
            .await
            .unwrap();

        let service = EngagementService::new(Arc::clone(&mods));
        assert!(service.change_likes("Foo", LikeChange::Add).await.unwrap());

        let stored = mods.find("Foo").await.unwrap().unwrap();
        assert_eq!(stored.author, "bob");
        assert_eq!(stored.likes, 6);
    }
}
