//! Shared types for the chats crate

pub mod events;

pub use events::ChatEvent;
