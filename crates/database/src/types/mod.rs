//! Shared types and result types for the database layer

pub mod errors;

// Re-export common types
pub use errors::{AuthError, ChatError, DatabaseError, UserError};

// Common result types
pub type DatabaseResult<T> = Result<T, DatabaseError>;
pub type UserResult<T> = Result<T, UserError>;
pub type ChatResult<T> = Result<T, ChatError>;
pub type AuthResult<T> = Result<T, AuthError>;
