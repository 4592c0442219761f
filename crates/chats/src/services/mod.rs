//! Business logic services for rooms and messages

pub mod message_service;
pub mod room_service;

pub use message_service::MessageService;
pub use room_service::RoomService;
