//! Parley Database Crate
//!
//! This crate provides database functionality for the Parley chat
//! backend: connection management, migrations, the entity definitions,
//! and the repository implementations that enforce the domain rules
//! (symmetric friendships, derived room kinds, per-user read tracking,
//! immutable messages with room-scoped cascade).

use sqlx::SqlitePool;

pub mod connection;
pub mod entities;
pub mod migrations;
pub mod repos;
pub mod types;

pub use connection::prepare_database;
pub use migrations::run_migrations;
pub use parley_config::DatabaseConfig;

// Re-export repositories
pub use repos::{FriendRepository, MessageRepository, RoomRepository, UserRepository};

// Re-export entities
pub use entities::{
    message::{CreateMessageRequest, Message, MessageView},
    room::{Room, RoomKind},
    user::{CreateUserRequest, User, UserProfile, ViewedMap},
};

// Re-export types
pub use types::{
    errors::{AuthError, ChatError, DatabaseError, UserError},
    AuthResult, ChatResult, DatabaseResult, UserResult,
};

/// Initialize the database with migrations
pub async fn initialize_database(config: &DatabaseConfig) -> DatabaseResult<SqlitePool> {
    let pool = prepare_database(config)
        .await
        .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

    run_migrations(&pool)
        .await
        .map_err(|e| DatabaseError::MigrationError(e.to_string()))?;

    Ok(pool)
}
