//! Input validation utilities.

use parley_database::UserError;
use regex::Regex;

/// Validate email format
pub fn validate_email(email: &str) -> Result<(), UserError> {
    if email.len() > 255 {
        return Err(UserError::InvalidEmail);
    }

    let email_regex = Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .map_err(|_| UserError::InvalidEmail)?;

    if !email_regex.is_match(email) {
        return Err(UserError::InvalidEmail);
    }

    Ok(())
}

/// Validate username: 3-30 characters, letters, digits, underscores and
/// hyphens. Usernames are immutable login and mention identifiers, so
/// the rules are strict at the door.
pub fn validate_username(username: &str) -> Result<(), UserError> {
    if username.len() < 3 {
        return Err(UserError::InvalidUsername(
            "must be at least 3 characters long".to_string(),
        ));
    }

    if username.len() > 30 {
        return Err(UserError::InvalidUsername(
            "must be at most 30 characters long".to_string(),
        ));
    }

    let username_regex = Regex::new(r"^[a-zA-Z0-9_-]+$")
        .map_err(|_| UserError::InvalidUsername("invalid username rules".to_string()))?;

    if !username_regex.is_match(username) {
        return Err(UserError::InvalidUsername(
            "may only contain letters, numbers, underscores, and hyphens".to_string(),
        ));
    }

    Ok(())
}
