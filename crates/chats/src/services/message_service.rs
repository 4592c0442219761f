//! Message service with persist-then-notify delivery ordering.

use crate::types::ChatEvent;
use parley_database::{
    ChatError, ChatResult, CreateMessageRequest, MessageRepository, MessageView, RoomRepository,
    UserRepository,
};
use sqlx::SqlitePool;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Service for posting and reading messages
#[derive(Clone)]
pub struct MessageService {
    messages: MessageRepository,
    rooms: RoomRepository,
    users: UserRepository,
    events: broadcast::Sender<ChatEvent>,
}

impl MessageService {
    /// Create a new message service over a database pool
    pub fn new(pool: SqlitePool, events: broadcast::Sender<ChatEvent>) -> Self {
        Self {
            messages: MessageRepository::new(pool.clone()),
            rooms: RoomRepository::new(pool.clone()),
            users: UserRepository::new(pool),
            events,
        }
    }

    /// Subscribe to committed chat events
    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.events.subscribe()
    }

    /// Post a message to a room. The row is committed first; only then
    /// is the event broadcast, so a delivery failure can never lose a
    /// message and a reload always reflects committed state.
    pub async fn post(&self, room_name: &str, username: &str, text: &str) -> ChatResult<MessageView> {
        let room = self
            .rooms
            .find_by_name(room_name)
            .await?
            .ok_or(ChatError::RoomNotFound)?;

        let message = self
            .messages
            .create(&CreateMessageRequest {
                room_id: room.id,
                username: username.to_string(),
                text: text.to_string(),
            })
            .await?;

        let view = MessageView::from_message(&message, &room.name);

        // Read-state upkeep for the other members is best effort; the
        // message itself is already durable.
        if let Err(err) = self.bump_unread(room.id, &room.name, username).await {
            warn!(%err, room_name, "failed to bump unread markers");
        }

        if let Err(err) = self.events.send(ChatEvent::MessageCreated {
            message: view.clone(),
        }) {
            debug!(%err, "no event subscribers for new message");
        }

        Ok(view)
    }

    async fn bump_unread(&self, room_id: i64, room_name: &str, author: &str) -> ChatResult<()> {
        let author_id = self
            .users
            .find_by_username(author)
            .await
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?
            .map(|u| u.id);

        for member_id in self.rooms.member_ids(room_id).await? {
            if Some(member_id) == author_id {
                continue;
            }
            self.users
                .increment_unread(member_id, room_name)
                .await
                .map_err(|e| ChatError::DatabaseError(e.to_string()))?;
        }

        Ok(())
    }

    /// Fetch a single message view by id
    pub async fn get(&self, id: i64) -> ChatResult<MessageView> {
        self.messages
            .find_view_by_id(id)
            .await?
            .ok_or(ChatError::MessageNotFound)
    }

    /// All messages of a room, oldest first
    pub async fn list_for_room(&self, room_name: &str) -> ChatResult<Vec<MessageView>> {
        let room = self
            .rooms
            .find_by_name(room_name)
            .await?
            .ok_or(ChatError::RoomNotFound)?;
        self.messages.list_views_for_room(room.id).await
    }

    /// Most recent messages across all rooms, newest first
    pub async fn recent(&self, limit: i64) -> ChatResult<Vec<MessageView>> {
        self.messages.recent(limit).await
    }
}
