//! User repository for database operations.

use crate::entities::{CreateUserRequest, User, ViewedMap};
use crate::types::{UserError, UserResult};
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tracing::info;

const USER_COLUMNS: &str = "id, username, email, active, photo_url, last_seen, viewed";

/// Repository for user database operations
#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find user by ID
    pub async fn find_by_id(&self, id: i64) -> UserResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        row.map(row_to_user).transpose()
    }

    /// Find user by username
    pub async fn find_by_username(&self, username: &str) -> UserResult<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ?"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        row.map(row_to_user).transpose()
    }

    /// Find user by email
    pub async fn find_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        row.map(row_to_user).transpose()
    }

    /// Create a new user. Username and email are unique and immutable
    /// once created; constraint violations surface as distinct errors.
    pub async fn create(&self, request: &CreateUserRequest) -> UserResult<User> {
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO users (username, email, password_hash, active, photo_url, last_seen, viewed)
             VALUES (?, ?, ?, false, ?, ?, '{}')",
        )
        .bind(&request.username)
        .bind(&request.email)
        .bind(&request.password_hash)
        .bind(&request.photo_url)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let text = e.to_string();
            if text.contains("UNIQUE constraint failed") {
                if text.contains("email") {
                    UserError::EmailTaken
                } else {
                    UserError::UsernameTaken
                }
            } else {
                UserError::DatabaseError(text)
            }
        })?;

        let user_id = result.last_insert_rowid();
        info!(user_id, username = %request.username, "created new user");

        self.find_by_id(user_id)
            .await?
            .ok_or_else(|| UserError::DatabaseError("failed to retrieve created user".to_string()))
    }

    /// Fetch the stored password hash for a username. Kept off the
    /// [`User`] entity so projections cannot leak it.
    pub async fn password_hash(&self, username: &str) -> UserResult<String> {
        let hash: Option<String> =
            sqlx::query_scalar("SELECT password_hash FROM users WHERE username = ?")
                .bind(username)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        hash.ok_or(UserError::UserNotFound)
    }

    /// Replace the stored password hash
    pub async fn update_password(&self, user_id: i64, password_hash: &str) -> UserResult<()> {
        let result = sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(UserError::UserNotFound);
        }

        Ok(())
    }

    /// Move `last_seen` forward to now. The MAX guard keeps the column
    /// monotonically non-decreasing even if the clock steps backwards.
    pub async fn touch_last_seen(&self, user_id: i64) -> UserResult<()> {
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query("UPDATE users SET last_seen = MAX(last_seen, ?) WHERE id = ?")
            .bind(&now)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(UserError::UserNotFound);
        }

        Ok(())
    }

    /// Flip the active flag
    pub async fn set_active(&self, user_id: i64, active: bool) -> UserResult<()> {
        let result = sqlx::query("UPDATE users SET active = ? WHERE id = ?")
            .bind(active)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(UserError::UserNotFound);
        }

        Ok(())
    }

    /// Mark one room as caught up for a user. The whole viewed map is
    /// read, copied with only the named entry changed, and written back
    /// in a single UPDATE, so concurrent views of different rooms never
    /// share mutable state and the change is committed before returning.
    pub async fn view_room(&self, user_id: i64, room_name: &str) -> UserResult<()> {
        let raw: Option<String> = sqlx::query_scalar("SELECT viewed FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        let raw = raw.ok_or(UserError::UserNotFound)?;
        let mut viewed = ViewedMap::from_json(&raw)
            .map_err(|e| UserError::SerializationError(e.to_string()))?;
        viewed.mark_viewed(room_name);
        let updated = viewed
            .to_json()
            .map_err(|e| UserError::SerializationError(e.to_string()))?;

        sqlx::query("UPDATE users SET viewed = ? WHERE id = ?")
            .bind(&updated)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        info!(user_id, room_name, "room marked as viewed");
        Ok(())
    }

    /// Bump the unread marker for a room in a user's viewed map
    pub async fn increment_unread(&self, user_id: i64, room_name: &str) -> UserResult<()> {
        let raw: Option<String> = sqlx::query_scalar("SELECT viewed FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        let raw = raw.ok_or(UserError::UserNotFound)?;
        let mut viewed = ViewedMap::from_json(&raw)
            .map_err(|e| UserError::SerializationError(e.to_string()))?;
        viewed.set(room_name, viewed.unread(room_name) + 1);
        let updated = viewed
            .to_json()
            .map_err(|e| UserError::SerializationError(e.to_string()))?;

        sqlx::query("UPDATE users SET viewed = ? WHERE id = ?")
            .bind(&updated)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    /// Delete a user. Friendship edges and room memberships cascade;
    /// authored messages are retained under the written username.
    pub async fn delete(&self, user_id: i64) -> UserResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(UserError::UserNotFound);
        }

        info!(user_id, "deleted user");
        Ok(())
    }
}

fn row_to_user(row: sqlx::sqlite::SqliteRow) -> UserResult<User> {
    let raw_viewed: String = row
        .try_get("viewed")
        .map_err(|e| UserError::DatabaseError(e.to_string()))?;
    let viewed =
        ViewedMap::from_json(&raw_viewed).map_err(|e| UserError::SerializationError(e.to_string()))?;

    Ok(User {
        id: row
            .try_get("id")
            .map_err(|e| UserError::DatabaseError(e.to_string()))?,
        username: row
            .try_get("username")
            .map_err(|e| UserError::DatabaseError(e.to_string()))?,
        email: row
            .try_get("email")
            .map_err(|e| UserError::DatabaseError(e.to_string()))?,
        active: row
            .try_get("active")
            .map_err(|e| UserError::DatabaseError(e.to_string()))?,
        photo_url: row
            .try_get("photo_url")
            .map_err(|e| UserError::DatabaseError(e.to_string()))?,
        last_seen: row
            .try_get("last_seen")
            .map_err(|e| UserError::DatabaseError(e.to_string()))?,
        viewed,
    })
}
