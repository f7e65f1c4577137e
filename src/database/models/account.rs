//! Account model.
//!
//! A user record with plaintext credentials and an ordered favorites list.

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Account stored in the `accounts` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// MongoDB document ID
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    /// Unique username (exact comparison)
    pub username: String,

    /// Plaintext password, compared verbatim on update
    pub password: String,

    /// Favorited mod names, insertion ordered, no duplicates
    #[serde(default)]
    pub favorite_mod_names: Vec<String>,
}

impl Account {
    /// Create a new account with an empty favorites list.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            id: None,
            username: username.into(),
            password: password.into(),
            favorite_mod_names: Vec::new(),
        }
    }

    /// Append a mod name to the favorites.
    ///
    /// Returns `false` and leaves the list untouched if the name is already there.
    pub fn add_favorite_mod(&mut self, mod_name: impl Into<String>) -> bool {
        let mod_name = mod_name.into();
        if self.favorite_mod_names.contains(&mod_name) {
            return false;
        }
        self.favorite_mod_names.push(mod_name);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson;

    #[test]
    fn test_add_favorite_rejects_duplicates() {
        let mut account = Account::new("alice", "hunter2");

        assert!(account.add_favorite_mod("Foo"));
        assert!(account.add_favorite_mod("Bar"));
        assert!(!account.add_favorite_mod("Foo"));

        assert_eq!(account.favorite_mod_names, vec!["Foo", "Bar"]);
    }

    #[test]
    fn test_favorites_are_case_sensitive() {
        let mut account = Account::new("alice", "hunter2");

        assert!(account.add_favorite_mod("foo"));
        assert!(account.add_favorite_mod("Foo"));
        assert_eq!(account.favorite_mod_names.len(), 2);
    }

    #[test]
    fn test_field_names() {
        let doc = bson::to_document(&Account::new("alice", "pw")).unwrap();

        assert_eq!(doc.get_str("username").unwrap(), "alice");
        assert_eq!(doc.get_str("password").unwrap(), "pw");
        assert!(doc.get_array("favoriteModNames").unwrap().is_empty());
        assert!(!doc.contains_key("_id"));
    }
}
