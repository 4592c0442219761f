//! # Parley Users Crate
//!
//! User accounts and authentication for the Parley chat backend:
//! registration, salted password hashing, signed auth tokens, avatar
//! URLs, and the friendship facade over the database layer.

pub mod services;
pub mod utils;

// Re-export database types and repositories
pub use parley_database::{
    AuthError, AuthResult, CreateUserRequest, FriendRepository, User, UserError, UserProfile,
    UserRepository, UserResult, ViewedMap,
};

// Re-export main types for convenience
pub use services::{RegisterRequest, UserService};
pub use utils::{avatar_url, Claims, TokenIssuer};
