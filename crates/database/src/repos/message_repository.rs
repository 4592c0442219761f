//! Repository for message data access operations.
//!
//! Messages are write-once: the repository exposes creation and ordered
//! retrieval, and deliberately no update path.

use crate::entities::{CreateMessageRequest, Message, MessageView};
use crate::types::{ChatError, ChatResult};
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tracing::info;

/// Repository for message database operations
#[derive(Clone)]
pub struct MessageRepository {
    pool: SqlitePool,
}

impl MessageRepository {
    /// Create a new message repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Persist a new message. The creation timestamp is assigned here,
    /// once, and never modified afterwards.
    pub async fn create(&self, request: &CreateMessageRequest) -> ChatResult<Message> {
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO messages (room_id, username, text, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(request.room_id)
        .bind(&request.username)
        .bind(&request.text)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if e.to_string().contains("FOREIGN KEY constraint failed") {
                ChatError::RoomNotFound
            } else {
                ChatError::DatabaseError(e.to_string())
            }
        })?;

        let message_id = result.last_insert_rowid();

        info!(
            message_id,
            room_id = request.room_id,
            username = %request.username,
            "created new message"
        );

        Ok(Message {
            id: message_id,
            room_id: request.room_id,
            username: request.username.clone(),
            text: request.text.clone(),
            created_at: now,
        })
    }

    /// Find a message by ID
    pub async fn find_by_id(&self, id: i64) -> ChatResult<Option<Message>> {
        let row = sqlx::query(
            "SELECT id, room_id, username, text, created_at FROM messages WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        row.map(row_to_message).transpose()
    }

    /// Wire-facing view of a single message, with its room name joined in
    pub async fn find_view_by_id(&self, id: i64) -> ChatResult<Option<MessageView>> {
        let row = sqlx::query(
            "SELECT m.id, r.name AS roomname, m.text, m.username, m.created_at
             FROM messages m JOIN rooms r ON r.id = m.room_id
             WHERE m.id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        row.map(row_to_view).transpose()
    }

    /// All messages of a room, ordered by creation time ascending
    pub async fn list_for_room(&self, room_id: i64) -> ChatResult<Vec<Message>> {
        let rows = sqlx::query(
            "SELECT id, room_id, username, text, created_at FROM messages
             WHERE room_id = ? ORDER BY created_at ASC, id ASC",
        )
        .bind(room_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(row_to_message).collect()
    }

    /// Wire-facing views for a room, ordered by creation time ascending
    pub async fn list_views_for_room(&self, room_id: i64) -> ChatResult<Vec<MessageView>> {
        let rows = sqlx::query(
            "SELECT m.id, r.name AS roomname, m.text, m.username, m.created_at
             FROM messages m JOIN rooms r ON r.id = m.room_id
             WHERE m.room_id = ? ORDER BY m.created_at ASC, m.id ASC",
        )
        .bind(room_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(row_to_view).collect()
    }

    /// Most recent messages across all rooms, newest first
    pub async fn recent(&self, limit: i64) -> ChatResult<Vec<MessageView>> {
        let rows = sqlx::query(
            "SELECT m.id, r.name AS roomname, m.text, m.username, m.created_at
             FROM messages m JOIN rooms r ON r.id = m.room_id
             ORDER BY m.created_at DESC, m.id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(row_to_view).collect()
    }

    /// Message count for a room
    pub async fn count_for_room(&self, room_id: i64) -> ChatResult<i64> {
        let count: Option<i64> =
            sqlx::query_scalar("SELECT COUNT(*) FROM messages WHERE room_id = ?")
                .bind(room_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        Ok(count.unwrap_or(0))
    }
}

fn row_to_message(row: sqlx::sqlite::SqliteRow) -> ChatResult<Message> {
    Ok(Message {
        id: row
            .try_get("id")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
        room_id: row
            .try_get("room_id")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
        username: row
            .try_get("username")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
        text: row
            .try_get("text")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
        created_at: row
            .try_get("created_at")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
    })
}

fn row_to_view(row: sqlx::sqlite::SqliteRow) -> ChatResult<MessageView> {
    Ok(MessageView {
        id: row
            .try_get("id")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
        roomname: row
            .try_get("roomname")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
        text: row
            .try_get("text")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
        username: row
            .try_get("username")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
        time: row
            .try_get("created_at")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
    })
}
