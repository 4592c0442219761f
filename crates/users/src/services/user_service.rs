//! User service: registration, credentials, tokens, friendships.

use crate::utils::{
    avatar_url, hash_password, validate_email, validate_username, verify_password, TokenIssuer,
};
use parley_config::AuthConfig;
use parley_database::{
    AuthResult, CreateUserRequest, FriendRepository, User, UserError, UserProfile, UserRepository,
    UserResult,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub photo_url: Option<String>,
}

/// Service for managing user accounts and their relations
#[derive(Clone)]
pub struct UserService {
    users: UserRepository,
    friends: FriendRepository,
    tokens: TokenIssuer,
}

impl UserService {
    /// Create a new user service over a database pool
    pub fn new(pool: SqlitePool, auth: &AuthConfig) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            friends: FriendRepository::new(pool),
            tokens: TokenIssuer::new(auth),
        }
    }

    /// Get a user by ID
    pub async fn get_user(&self, user_id: i64) -> UserResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(UserError::UserNotFound)
    }

    /// Get a user by username
    pub async fn get_user_by_username(&self, username: &str) -> UserResult<User> {
        self.users
            .find_by_username(username)
            .await?
            .ok_or(UserError::UserNotFound)
    }

    /// Register a new account: validate, hash the password, store
    pub async fn register(&self, request: RegisterRequest) -> UserResult<User> {
        validate_username(&request.username)?;
        validate_email(&request.email)?;

        let password_hash = hash_password(&request.password)?;

        let user = self
            .users
            .create(&CreateUserRequest {
                username: request.username,
                email: request.email,
                password_hash,
                photo_url: request.photo_url,
            })
            .await?;

        info!(user_id = user.id, username = %user.username, "registered new user");
        Ok(user)
    }

    /// Check a password against the stored hash. A wrong password is
    /// `Ok(false)`; only an unknown username is an error.
    pub async fn check_password(&self, username: &str, password: &str) -> UserResult<bool> {
        let hash = self.users.password_hash(username).await?;
        verify_password(password, &hash)
    }

    /// Replace a user's password
    pub async fn change_password(&self, user_id: i64, new_password: &str) -> UserResult<()> {
        let hash = hash_password(new_password)?;
        self.users.update_password(user_id, &hash).await
    }

    /// Issue a signed auth token for a user
    pub fn encode_auth_token(&self, user_id: i64) -> AuthResult<String> {
        self.tokens.encode(user_id)
    }

    /// Decode a token back to the user id it asserts
    pub fn decode_auth_token(&self, token: &str) -> AuthResult<i64> {
        self.tokens.decode(token)
    }

    /// Wire-facing profile projection of a user
    pub async fn profile(&self, user_id: i64) -> UserResult<UserProfile> {
        let user = self.get_user(user_id).await?;
        Ok(UserProfile::from(&user))
    }

    /// Deterministic identicon URL for a user
    pub async fn avatar(&self, user_id: i64, size: u32) -> UserResult<String> {
        let user = self.get_user(user_id).await?;
        Ok(avatar_url(&user.email, size))
    }

    /// Establish a symmetric friendship; no-op for self or existing
    pub async fn add_friend(&self, user_id: i64, other_id: i64) -> UserResult<()> {
        self.friends.add_friend(user_id, other_id).await
    }

    /// Remove a friendship; no-op when it does not exist
    pub async fn delete_friend(&self, user_id: i64, other_id: i64) -> UserResult<()> {
        self.friends.delete_friend(user_id, other_id).await
    }

    /// Whether the directed friendship edge exists
    pub async fn is_friend(&self, user_id: i64, other_id: i64) -> UserResult<bool> {
        self.friends.is_friend(user_id, other_id).await
    }

    /// Usernames of a user's friends
    pub async fn friend_usernames(&self, user_id: i64) -> UserResult<Vec<String>> {
        self.friends.friend_usernames(user_id).await
    }

    /// Mark a room as caught up for a user
    pub async fn view_room(&self, user_id: i64, room_name: &str) -> UserResult<()> {
        self.users.view_room(user_id, room_name).await
    }

    /// Record activity: move last_seen forward
    pub async fn touch_last_seen(&self, user_id: i64) -> UserResult<()> {
        self.users.touch_last_seen(user_id).await
    }

    /// Flip the active flag
    pub async fn set_active(&self, user_id: i64, active: bool) -> UserResult<()> {
        self.users.set_active(user_id, active).await
    }

    /// Delete an account. Authored messages are retained under the
    /// written username; edges and memberships cascade.
    pub async fn delete_user(&self, user_id: i64) -> UserResult<()> {
        self.users.delete(user_id).await
    }
}
