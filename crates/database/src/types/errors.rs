//! Error types for the database layer

use thiserror::Error;

/// General database error
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Database connection error: {0}")]
    ConnectionError(String),

    #[error("Database migration error: {0}")]
    MigrationError(String),
}

/// User-specific database errors
#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found")]
    UserNotFound,

    #[error("Username already exists")]
    UsernameTaken,

    #[error("Email already exists")]
    EmailTaken,

    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("Invalid password hash")]
    InvalidPasswordHash,

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Chat-specific database errors
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Room not found")]
    RoomNotFound,

    #[error("Room already exists")]
    RoomAlreadyExists,

    #[error("Message not found")]
    MessageNotFound,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// Auth token errors. Expired and invalid tokens stay distinguishable so
/// callers can tell a re-login prompt from a rejected credential.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Signature expired. Please log in again")]
    TokenExpired,

    #[error("Invalid token. Please log in again")]
    TokenInvalid,

    #[error("Token signing failed: {0}")]
    SigningFailed(String),
}
