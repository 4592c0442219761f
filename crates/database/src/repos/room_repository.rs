//! Room repository for database operations.

use crate::entities::{Room, RoomKind};
use crate::types::{ChatError, ChatResult};
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tracing::info;

/// Repository for room and membership database operations
#[derive(Clone)]
pub struct RoomRepository {
    pool: SqlitePool,
}

impl RoomRepository {
    /// Create a new room repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new room with a globally unique name
    pub async fn create(&self, name: &str) -> ChatResult<Room> {
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query("INSERT INTO rooms (name, created_at) VALUES (?, ?)")
            .bind(name)
            .bind(&now)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if e.to_string().contains("UNIQUE constraint failed") {
                    ChatError::RoomAlreadyExists
                } else {
                    ChatError::DatabaseError(e.to_string())
                }
            })?;

        let room_id = result.last_insert_rowid();
        info!(room_id, name, "created new room");

        Ok(Room {
            id: room_id,
            name: name.to_string(),
            created_at: now,
        })
    }

    /// Find room by ID
    pub async fn find_by_id(&self, id: i64) -> ChatResult<Option<Room>> {
        let row = sqlx::query("SELECT id, name, created_at FROM rooms WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        row.map(row_to_room).transpose()
    }

    /// Find room by name
    pub async fn find_by_name(&self, name: &str) -> ChatResult<Option<Room>> {
        let row = sqlx::query("SELECT id, name, created_at FROM rooms WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        row.map(row_to_room).transpose()
    }

    /// Add a user to a room. Membership is a set: adding an existing
    /// member is a no-op.
    pub async fn add_member(&self, room_id: i64, user_id: i64) -> ChatResult<()> {
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT OR IGNORE INTO room_members (room_id, user_id, joined_at) VALUES (?, ?, ?)",
        )
        .bind(room_id)
        .bind(user_id)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        info!(room_id, user_id, "member added to room");
        Ok(())
    }

    /// Remove a user from a room; removing a non-member is a no-op
    pub async fn remove_member(&self, room_id: i64, user_id: i64) -> ChatResult<()> {
        sqlx::query("DELETE FROM room_members WHERE room_id = ? AND user_id = ?")
            .bind(room_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    /// Whether a user belongs to a room
    pub async fn is_member(&self, room_id: i64, user_id: i64) -> ChatResult<bool> {
        let found: Option<i64> = sqlx::query_scalar(
            "SELECT 1 FROM room_members WHERE room_id = ? AND user_id = ? LIMIT 1",
        )
        .bind(room_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        Ok(found.is_some())
    }

    /// Current membership cardinality of a room
    pub async fn member_count(&self, room_id: i64) -> ChatResult<i64> {
        let count: Option<i64> =
            sqlx::query_scalar("SELECT COUNT(*) FROM room_members WHERE room_id = ?")
                .bind(room_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        Ok(count.unwrap_or(0))
    }

    /// Derived room classification, recomputed from the current
    /// membership on every call and never stored.
    pub async fn kind(&self, room_id: i64) -> ChatResult<RoomKind> {
        let count = self.member_count(room_id).await?;
        Ok(RoomKind::from_member_count(count))
    }

    /// User ids of a room's members in join order
    pub async fn member_ids(&self, room_id: i64) -> ChatResult<Vec<i64>> {
        let ids: Vec<i64> = sqlx::query_scalar(
            "SELECT user_id FROM room_members WHERE room_id = ? ORDER BY joined_at, user_id",
        )
        .bind(room_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        Ok(ids)
    }

    /// Usernames of a room's members in join order
    pub async fn members(&self, room_id: i64) -> ChatResult<Vec<String>> {
        let names: Vec<String> = sqlx::query_scalar(
            "SELECT u.username FROM room_members rm
             JOIN users u ON u.id = rm.user_id
             WHERE rm.room_id = ?
             ORDER BY rm.joined_at, u.id",
        )
        .bind(room_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        Ok(names)
    }

    /// Names of the rooms a user belongs to, in join order
    pub async fn contacts(&self, user_id: i64) -> ChatResult<Vec<String>> {
        let names: Vec<String> = sqlx::query_scalar(
            "SELECT r.name FROM room_members rm
             JOIN rooms r ON r.id = rm.room_id
             WHERE rm.user_id = ?
             ORDER BY rm.joined_at, r.id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        Ok(names)
    }

    /// Delete a room. Its messages and membership rows cascade with it,
    /// so no orphan messages remain.
    pub async fn delete(&self, room_id: i64) -> ChatResult<()> {
        let result = sqlx::query("DELETE FROM rooms WHERE id = ?")
            .bind(room_id)
            .execute(&self.pool)
            .await
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(ChatError::RoomNotFound);
        }

        info!(room_id, "deleted room");
        Ok(())
    }
}

fn row_to_room(row: sqlx::sqlite::SqliteRow) -> ChatResult<Room> {
    Ok(Room {
        id: row
            .try_get("id")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
        name: row
            .try_get("name")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
        created_at: row
            .try_get("created_at")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::prepare_database;
    use crate::entities::CreateUserRequest;
    use crate::migrations::run_migrations;
    use crate::repos::UserRepository;
    use parley_config::DatabaseConfig;
    use tempfile::TempDir;

    async fn create_test_pool() -> (SqlitePool, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let config = DatabaseConfig {
            url: format!("sqlite:{}", db_path.display()),
            max_connections: 1,
        };

        let pool = prepare_database(&config).await.unwrap();
        run_migrations(&pool).await.unwrap();
        (pool, temp_dir)
    }

    async fn seed_user(pool: &SqlitePool, username: &str) -> i64 {
        let users = UserRepository::new(pool.clone());
        users
            .create(&CreateUserRequest {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                password_hash: "hash".to_string(),
                photo_url: None,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_room_names_are_unique() {
        let (pool, _dir) = create_test_pool().await;
        let repo = RoomRepository::new(pool);

        repo.create("general").await.unwrap();
        let err = repo.create("general").await.unwrap_err();
        assert!(matches!(err, ChatError::RoomAlreadyExists));
    }

    #[tokio::test]
    async fn test_kind_flips_with_membership() {
        let (pool, _dir) = create_test_pool().await;
        let repo = RoomRepository::new(pool.clone());

        let room = repo.create("trio").await.unwrap();
        let alice = seed_user(&pool, "alice").await;
        let bob = seed_user(&pool, "bob").await;
        let carol = seed_user(&pool, "carol").await;

        repo.add_member(room.id, alice).await.unwrap();
        repo.add_member(room.id, bob).await.unwrap();
        assert_eq!(repo.kind(room.id).await.unwrap(), RoomKind::Dialog);

        repo.add_member(room.id, carol).await.unwrap();
        assert_eq!(repo.kind(room.id).await.unwrap(), RoomKind::Group);

        repo.remove_member(room.id, carol).await.unwrap();
        assert_eq!(repo.kind(room.id).await.unwrap(), RoomKind::Dialog);
    }

    #[tokio::test]
    async fn test_membership_is_a_set() {
        let (pool, _dir) = create_test_pool().await;
        let repo = RoomRepository::new(pool.clone());

        let room = repo.create("general").await.unwrap();
        let alice = seed_user(&pool, "alice").await;

        repo.add_member(room.id, alice).await.unwrap();
        repo.add_member(room.id, alice).await.unwrap();

        assert_eq!(repo.member_count(room.id).await.unwrap(), 1);
        assert!(repo.is_member(room.id, alice).await.unwrap());

        repo.remove_member(room.id, alice).await.unwrap();
        repo.remove_member(room.id, alice).await.unwrap();
        assert_eq!(repo.member_count(room.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_contacts_lists_rooms_in_join_order() {
        let (pool, _dir) = create_test_pool().await;
        let repo = RoomRepository::new(pool.clone());

        let general = repo.create("general").await.unwrap();
        let random = repo.create("random").await.unwrap();
        let alice = seed_user(&pool, "alice").await;

        repo.add_member(general.id, alice).await.unwrap();
        repo.add_member(random.id, alice).await.unwrap();

        assert_eq!(
            repo.contacts(alice).await.unwrap(),
            vec!["general".to_string(), "random".to_string()]
        );
    }

    #[tokio::test]
    async fn test_members_returns_usernames() {
        let (pool, _dir) = create_test_pool().await;
        let repo = RoomRepository::new(pool.clone());

        let room = repo.create("general").await.unwrap();
        let alice = seed_user(&pool, "alice").await;
        let bob = seed_user(&pool, "bob").await;

        repo.add_member(room.id, alice).await.unwrap();
        repo.add_member(room.id, bob).await.unwrap();

        assert_eq!(
            repo.members(room.id).await.unwrap(),
            vec!["alice".to_string(), "bob".to_string()]
        );
    }

    #[tokio::test]
    async fn test_delete_missing_room() {
        let (pool, _dir) = create_test_pool().await;
        let repo = RoomRepository::new(pool);

        let err = repo.delete(404).await.unwrap_err();
        assert!(matches!(err, ChatError::RoomNotFound));
    }
}
