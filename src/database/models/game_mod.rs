//! Mod model.
//!
//! Metadata, tags, engagement counters and comments of a user-submitted
//! game modification package.

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// A single comment left on a mod.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub username: String,
    pub content: String,
}

impl Comment {
    pub fn new(username: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            content: content.into(),
        }
    }
}

/// Mod stored in the `mods` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mod {
    /// MongoDB document ID
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    /// Unique under case-insensitive comparison
    pub mod_name: String,

    /// Author username (recorded by value, never validated)
    #[serde(default)]
    pub author: String,

    #[serde(default)]
    pub desc: String,

    #[serde(default)]
    pub date_created: String,

    #[serde(default)]
    pub date_modified: String,

    /// Download link
    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub game_name: String,

    /// Tag set kept as an ordered list
    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub views: i64,

    /// Icon image path
    #[serde(default)]
    pub icon: String,

    /// Like counter; decrements have no floor
    #[serde(default)]
    pub likes: i64,

    #[serde(default)]
    pub comments: Vec<Comment>,

    /// Short description with keywords
    #[serde(default)]
    pub slug: String,
}

impl Mod {
    /// Create a mod with the given name and author, everything else empty.
    pub fn new(mod_name: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            id: None,
            mod_name: mod_name.into(),
            author: author.into(),
            desc: String::new(),
            date_created: String::new(),
            date_modified: String::new(),
            url: String::new(),
            game_name: String::new(),
            tags: Vec::new(),
            views: 0,
            icon: String::new(),
            likes: 0,
            comments: Vec::new(),
            slug: String::new(),
        }
    }

    /// Set the tags (builder pattern).
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn increment_views(&mut self) -> bool {
        self.views += 1;
        true
    }

    pub fn increment_likes(&mut self) -> bool {
        self.likes += 1;
        true
    }

    /// Drop one like. Can go below zero.
    pub fn decrement_likes(&mut self) -> bool {
        self.likes -= 1;
        true
    }

    /// Append a comment. Neither field is validated.
    pub fn add_comment(&mut self, username: impl Into<String>, content: impl Into<String>) {
        self.comments.push(Comment::new(username, content));
    }

    pub fn clear_comments(&mut self) {
        self.comments.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson;

    #[test]
    fn test_counters() {
        let mut m = Mod::new("Foo", "alice");
        assert!(m.increment_views());
        assert!(m.increment_views());
        assert!(m.increment_likes());

        assert_eq!(m.views, 2);
        assert_eq!(m.likes, 1);
    }

    #[test]
    fn test_likes_go_negative() {
        let mut m = Mod::new("Foo", "alice");
        m.decrement_likes();
        m.decrement_likes();
        assert_eq!(m.likes, -2);
    }

    #[test]
    fn test_comments_append_then_clear() {
        let mut m = Mod::new("Foo", "alice");
        m.add_comment("bob", "nice");
        m.add_comment("", "");

        assert_eq!(m.comments.len(), 2);
        assert_eq!(m.comments[0], Comment::new("bob", "nice"));

        m.clear_comments();
        assert!(m.comments.is_empty());
    }

    #[test]
    fn test_field_names() {
        let m = Mod::new("Foo", "alice").with_tags(["a", "b"]);
        let doc = bson::to_document(&m).unwrap();

        for key in [
            "modName", "author", "desc", "dateCreated", "dateModified", "url",
            "gameName", "tags", "views", "icon", "likes", "comments", "slug",
        ] {
            assert!(doc.contains_key(key), "missing {key}");
        }
        assert!(!doc.contains_key("_id"));
    }

    #[test]
    fn test_missing_fields_default() {
        let doc = bson::doc! { "modName": "Foo" };
        let m: Mod = bson::from_document(doc).unwrap();

        assert_eq!(m.mod_name, "Foo");
        assert_eq!(m.views, 0);
        assert!(m.tags.is_empty());
    }
}
