//! # Parley Chats Crate
//!
//! Rooms, messages and realtime events for the Parley chat backend.
//! Services here persist through the database layer first and broadcast
//! committed events afterwards; delivery to connected clients is the
//! transport collaborator's job.

pub mod services;
pub mod types;

// Re-export database types
pub use parley_database::{
    ChatError, ChatResult, Message, MessageRepository, MessageView, Room, RoomKind, RoomRepository,
};

// Re-export main types for convenience
pub use services::{MessageService, RoomService};
pub use types::ChatEvent;
