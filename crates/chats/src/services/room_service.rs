//! Room service: creation, membership, derived classification.

use crate::types::ChatEvent;
use parley_database::{ChatError, ChatResult, Room, RoomKind, RoomRepository};
use sqlx::SqlitePool;
use tokio::sync::broadcast;
use tracing::{debug, info};

/// Service for managing rooms and their membership
#[derive(Clone)]
pub struct RoomService {
    rooms: RoomRepository,
    events: broadcast::Sender<ChatEvent>,
}

impl RoomService {
    /// Create a new room service over a database pool
    pub fn new(pool: SqlitePool, events: broadcast::Sender<ChatEvent>) -> Self {
        Self {
            rooms: RoomRepository::new(pool),
            events,
        }
    }

    /// Get a room by name
    pub async fn get_room(&self, name: &str) -> ChatResult<Room> {
        self.rooms
            .find_by_name(name)
            .await?
            .ok_or(ChatError::RoomNotFound)
    }

    /// Create a room with a unique name
    pub async fn create_room(&self, name: &str) -> ChatResult<Room> {
        self.rooms.create(name).await
    }

    /// Add a user to a room's membership set
    pub async fn join(&self, room_name: &str, user_id: i64) -> ChatResult<()> {
        let room = self.get_room(room_name).await?;
        self.rooms.add_member(room.id, user_id).await
    }

    /// Remove a user from a room's membership set
    pub async fn leave(&self, room_name: &str, user_id: i64) -> ChatResult<()> {
        let room = self.get_room(room_name).await?;
        self.rooms.remove_member(room.id, user_id).await
    }

    /// Derived classification: dialog for two members, group beyond.
    /// Recomputed from the membership on every call.
    pub async fn kind(&self, room_name: &str) -> ChatResult<RoomKind> {
        let room = self.get_room(room_name).await?;
        self.rooms.kind(room.id).await
    }

    /// Usernames of a room's members
    pub async fn members(&self, room_name: &str) -> ChatResult<Vec<String>> {
        let room = self.get_room(room_name).await?;
        self.rooms.members(room.id).await
    }

    /// Names of the rooms a user belongs to, in join order
    pub async fn contacts(&self, user_id: i64) -> ChatResult<Vec<String>> {
        self.rooms.contacts(user_id).await
    }

    /// Delete a room and, through the cascade, all of its messages. The
    /// deletion is committed before the event goes out.
    pub async fn delete_room(&self, room_name: &str) -> ChatResult<()> {
        let room = self.get_room(room_name).await?;
        self.rooms.delete(room.id).await?;

        info!(room_name, "room deleted with its messages");

        if let Err(err) = self.events.send(ChatEvent::RoomDeleted {
            roomname: room.name,
        }) {
            debug!(%err, "no event subscribers for room deletion");
        }

        Ok(())
    }
}
