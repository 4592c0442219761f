//! User entity definitions

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// User entity representing an account in the system.
///
/// The password hash is deliberately not part of this struct; it is only
/// reachable through [`crate::UserRepository::password_hash`], so no
/// projection or event can leak it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub active: bool,
    pub photo_url: Option<String>,
    pub last_seen: String,
    pub viewed: ViewedMap,
}

/// Request for creating a new user. The password arrives already hashed;
/// hashing lives in the users crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub photo_url: Option<String>,
}

/// Wire-facing projection of a user. Stable key set: id, username,
/// email, photo_url, last_seen. Internal fields (password hash, friend
/// edges, viewed map) are never included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub photo_url: Option<String>,
    pub last_seen: String,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            photo_url: user.photo_url.clone(),
            last_seen: user.last_seen.clone(),
        }
    }
}

/// Per-user read-state: room name mapped to an unread marker. Stored as
/// a JSON document so the column stays inspectable and migration-safe.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewedMap(BTreeMap<String, i64>);

impl ViewedMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unread marker for a room; rooms never viewed report 0.
    pub fn unread(&self, room_name: &str) -> i64 {
        self.0.get(room_name).copied().unwrap_or(0)
    }

    /// Mark a room as caught up, leaving every other entry untouched.
    pub fn mark_viewed(&mut self, room_name: &str) {
        self.0.insert(room_name.to_string(), 0);
    }

    pub fn set(&mut self, room_name: &str, marker: i64) {
        self.0.insert(room_name.to_string(), marker);
    }

    pub fn contains(&self, room_name: &str) -> bool {
        self.0.contains_key(room_name)
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
