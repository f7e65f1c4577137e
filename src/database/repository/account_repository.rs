//! Account repository.
//!
//! Usernames are unique under exact comparison. Every check-then-write
//! below is two separate store calls, so two racing callers can both pass
//! the check.

use std::sync::Arc;

use mongodb::bson::doc;
use tracing::{info, warn};

use super::{decode, encode};
use crate::database::filter::Filter;
use crate::database::models::Account;
use crate::database::store::{DocumentStore, StoreResult};

/// Repository for accounts.
#[derive(Clone)]
pub struct AccountRepository {
    collection: Arc<dyn DocumentStore>,
}

impl AccountRepository {
    pub fn new(collection: Arc<dyn DocumentStore>) -> Self {
        Self { collection }
    }

    fn by_username(username: &str) -> Filter {
        Filter::new().eq("username", username)
    }

    /// Insert an account. `false` if the username is taken.
    pub async fn insert(&self, account: &Account) -> StoreResult<bool> {
        let filter = Self::by_username(&account.username);
        if self.collection.find_one(&filter).await?.is_some() {
            warn!("Account [{}] already exists", account.username);
            return Ok(false);
        }

        self.collection.insert_one(encode(account)?).await?;
        info!("Account [{}] created", account.username);
        Ok(true)
    }

    /// Seed `admin`, `user` and `author` (password = username).
    ///
    /// Only runs on an empty store; `false` otherwise.
    pub async fn insert_dummy_accounts(&self) -> StoreResult<bool> {
        if self.collection.count(&Filter::new()).await? > 0 {
            warn!("Accounts store is not empty, dummy accounts not inserted");
            return Ok(false);
        }

        let docs = ["admin", "user", "author"]
            .into_iter()
            .map(|name| encode(&Account::new(name, name)))
            .collect::<StoreResult<Vec<_>>>()?;
        self.collection.insert_many(docs).await?;
        info!("Dummy accounts inserted");
        Ok(true)
    }

    /// Find an account by exact username.
    pub async fn find(&self, username: &str) -> StoreResult<Option<Account>> {
        match self.collection.find_one(&Self::by_username(username)).await? {
            Some(doc) => {
                info!("Account [{}] found", username);
                Ok(Some(decode(doc)?))
            }
            None => {
                warn!("Account [{}] not found", username);
                Ok(None)
            }
        }
    }

    /// All accounts matching the filter, possibly none.
    pub async fn search(&self, filter: &Filter) -> StoreResult<Vec<Account>> {
        let accounts = self
            .collection
            .find(filter)
            .await?
            .into_iter()
            .map(decode)
            .collect::<StoreResult<Vec<Account>>>()?;

        if accounts.is_empty() {
            warn!("No accounts found with filter: {}", filter);
        } else {
            info!("{} account(s) found with filter: {}", accounts.len(), filter);
        }
        Ok(accounts)
    }

    pub async fn get_all(&self) -> StoreResult<Vec<Account>> {
        self.search(&Filter::new()).await
    }

    pub async fn count(&self) -> StoreResult<u64> {
        self.collection.count(&Filter::new()).await
    }

    /// Delete an account. `false` if it does not exist.
    pub async fn remove(&self, username: &str) -> StoreResult<bool> {
        let filter = Self::by_username(username);
        if self.collection.find_one(&filter).await?.is_none() {
            warn!("Account [{}] does not exist, cannot delete", username);
            return Ok(false);
        }

        self.collection.delete_one(&filter).await?;
        info!("Account [{}] deleted", username);
        Ok(true)
    }

    /// Delete every account. `false` if there was nothing to delete.
    pub async fn remove_all(&self) -> StoreResult<bool> {
        let all = Filter::new();
        if self.collection.count(&all).await? == 0 {
            warn!("Accounts store is empty, cannot delete");
            return Ok(false);
        }

        let deleted = self.collection.delete_many(&all).await?;
        info!("All {} account(s) deleted", deleted);
        Ok(true)
    }

    /// Replace the password, given the current one.
    ///
    /// A missing account and a wrong password both yield `false`.
    pub async fn update(
        &self,
        old_username: &str,
        old_password: &str,
        new_password: &str,
    ) -> StoreResult<bool> {
        let filter = Self::by_username(old_username);
        let Some(doc) = self.collection.find_one(&filter).await? else {
            warn!("Account [{}] does not exist, cannot update", old_username);
            return Ok(false);
        };

        let account: Account = decode(doc)?;
        if account.password != old_password {
            warn!("Account [{}] password does not match, cannot update", old_username);
            return Ok(false);
        }

        self.collection
            .update_one(&filter, doc! { "username": old_username, "password": new_password })
            .await?;
        info!("Account [{}] password updated", old_username);
        Ok(true)
    }

    /// Persist a favorite-add. `false` if the account is missing or
    /// the mod is already a favorite.
    pub async fn add_favorite(&self, username: &str, mod_name: &str) -> StoreResult<bool> {
        let Some(mut account) = self.find(username).await? else {
            return Ok(false);
        };

        if !account.add_favorite_mod(mod_name) {
            warn!("Mod [{}] is already a favorite of [{}]", mod_name, username);
            return Ok(false);
        }

        self.collection
            .update_one(
                &Self::by_username(username),
                doc! { "favoriteModNames": account.favorite_mod_names.clone() },
            )
            .await?;
        info!("Account [{}] favorited mod [{}]", username, mod_name);
        Ok(true)
    }
}
