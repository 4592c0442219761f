//! Internal utilities for the users crate

pub mod avatar;
pub mod jwt;
pub mod password;
pub mod validation;

pub use avatar::avatar_url;
pub use jwt::{Claims, TokenIssuer};
pub use password::{hash_password, verify_password};
pub use validation::{validate_email, validate_username};
