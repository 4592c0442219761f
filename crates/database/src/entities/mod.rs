//! Entity definitions for the database layer

pub mod message;
pub mod room;
pub mod user;

pub use message::{CreateMessageRequest, Message, MessageView};
pub use room::{Room, RoomKind};
pub use user::{CreateUserRequest, User, UserProfile, ViewedMap};
