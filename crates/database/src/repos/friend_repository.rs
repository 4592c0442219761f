//! Friendship repository for database operations.
//!
//! A friendship between two users is stored as a pair of directed edges,
//! one per direction, so both sides can be traversed with an indexed
//! lookup. Every mutation keeps the pair consistent inside a single
//! transaction.

use crate::types::{UserError, UserResult};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

/// Repository for friendship edge operations
#[derive(Clone)]
pub struct FriendRepository {
    pool: SqlitePool,
}

impl FriendRepository {
    /// Create a new friend repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Establish a symmetric friendship between two distinct users.
    /// Self-friendship and already-existing friendships are no-ops. Both
    /// directed edges are inserted in one transaction, so a reader can
    /// never observe a half-added friendship.
    pub async fn add_friend(&self, user_id: i64, other_id: i64) -> UserResult<()> {
        if user_id == other_id {
            return Ok(());
        }

        if self.is_friend(user_id, other_id).await? {
            return Ok(());
        }

        let now = Utc::now().to_rfc3339();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        sqlx::query("INSERT OR IGNORE INTO friends (left_id, right_id, created_at) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(other_id)
            .bind(&now)
            .execute(&mut *tx)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        sqlx::query("INSERT OR IGNORE INTO friends (left_id, right_id, created_at) VALUES (?, ?, ?)")
            .bind(other_id)
            .bind(user_id)
            .bind(&now)
            .execute(&mut *tx)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        info!(user_id, other_id, "friendship added");
        Ok(())
    }

    /// Remove a friendship. Both directed edges go in one transaction;
    /// deleting a friendship that does not exist is a no-op.
    pub async fn delete_friend(&self, user_id: i64, other_id: i64) -> UserResult<()> {
        if user_id == other_id {
            return Ok(());
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        let removed = sqlx::query("DELETE FROM friends WHERE left_id = ? AND right_id = ?")
            .bind(user_id)
            .bind(other_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        sqlx::query("DELETE FROM friends WHERE left_id = ? AND right_id = ?")
            .bind(other_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        if removed.rows_affected() > 0 {
            info!(user_id, other_id, "friendship removed");
        }
        Ok(())
    }

    /// Whether the directed edge user -> other exists. Single indexed
    /// lookup on the (left_id, right_id) primary key.
    pub async fn is_friend(&self, user_id: i64, other_id: i64) -> UserResult<bool> {
        let found: Option<i64> = sqlx::query_scalar(
            "SELECT 1 FROM friends WHERE left_id = ? AND right_id = ? LIMIT 1",
        )
        .bind(user_id)
        .bind(other_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        Ok(found.is_some())
    }

    /// Ids of all friends of a user, oldest friendship first
    pub async fn friends_of(&self, user_id: i64) -> UserResult<Vec<i64>> {
        let ids: Vec<i64> = sqlx::query_scalar(
            "SELECT right_id FROM friends WHERE left_id = ? ORDER BY created_at, right_id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        Ok(ids)
    }

    /// Usernames of all friends of a user
    pub async fn friend_usernames(&self, user_id: i64) -> UserResult<Vec<String>> {
        let names: Vec<String> = sqlx::query_scalar(
            "SELECT u.username FROM friends f
             JOIN users u ON u.id = f.right_id
             WHERE f.left_id = ?
             ORDER BY f.created_at, u.username",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        Ok(names)
    }
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
    async fn test_friendship_is_symmetric() {
        let (pool, _dir) = create_test_pool().await;
        let repo = FriendRepository::new(pool.clone());

        let alice = seed_user(&pool, "alice").await;
        let bob = seed_user(&pool, "bob").await;

        repo.add_friend(alice, bob).await.unwrap();
        assert!(repo.is_friend(alice, bob).await.unwrap());
        assert!(repo.is_friend(bob, alice).await.unwrap());
    }

    #[tokio::test]
    async fn test_add_friend_is_idempotent() {
        let (pool, _dir) = create_test_pool().await;
        let repo = FriendRepository::new(pool.clone());

        let alice = seed_user(&pool, "alice").await;
        let bob = seed_user(&pool, "bob").await;

        repo.add_friend(alice, bob).await.unwrap();
        repo.add_friend(alice, bob).await.unwrap();
        repo.add_friend(bob, alice).await.unwrap();

        let edges: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM friends")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(edges, 2);
    }

    #[tokio::test]
    async fn test_self_friendship_is_rejected() {
        let (pool, _dir) = create_test_pool().await;
        let repo = FriendRepository::new(pool.clone());

        let alice = seed_user(&pool, "alice").await;

        repo.add_friend(alice, alice).await.unwrap();
        assert!(!repo.is_friend(alice, alice).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_friend_removes_both_edges() {
        let (pool, _dir) = create_test_pool().await;
        let repo = FriendRepository::new(pool.clone());

        let alice = seed_user(&pool, "alice").await;
        let bob = seed_user(&pool, "bob").await;

        repo.add_friend(alice, bob).await.unwrap();
        repo.delete_friend(bob, alice).await.unwrap();

        assert!(!repo.is_friend(alice, bob).await.unwrap());
        assert!(!repo.is_friend(bob, alice).await.unwrap());

        // Deleting again is a quiet no-op.
        repo.delete_friend(alice, bob).await.unwrap();
    }

    #[tokio::test]
    async fn test_friend_listing() {
        let (pool, _dir) = create_test_pool().await;
        let repo = FriendRepository::new(pool.clone());

        let alice = seed_user(&pool, "alice").await;
        let bob = seed_user(&pool, "bob").await;
        let carol = seed_user(&pool, "carol").await;

        repo.add_friend(alice, bob).await.unwrap();
        repo.add_friend(alice, carol).await.unwrap();

        assert_eq!(repo.friends_of(alice).await.unwrap(), vec![bob, carol]);
        assert_eq!(
            repo.friend_usernames(alice).await.unwrap(),
            vec!["bob".to_string(), "carol".to_string()]
        );
        assert_eq!(repo.friends_of(bob).await.unwrap(), vec![alice]);
    }

    #[tokio::test]
    async fn test_deleting_user_cascades_edges() {
        let (pool, _dir) = create_test_pool().await;
        let repo = FriendRepository::new(pool.clone());
        let users = UserRepository::new(pool.clone());

        let alice = seed_user(&pool, "alice").await;
        let bob = seed_user(&pool, "bob").await;

        repo.add_friend(alice, bob).await.unwrap();
        users.delete(bob).await.unwrap();

        assert!(!repo.is_friend(alice, bob).await.unwrap());
        let edges: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM friends")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(edges, 0);
    }
}
