//! Error types for the HTTP gateway layer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use parley_chats::ChatError;
use parley_users::{AuthError, UserError};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::AuthenticationFailed(_) => StatusCode::UNAUTHORIZED,
            GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::Conflict(_) => StatusCode::CONFLICT,
            GatewayError::InternalError(_) | GatewayError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_response = json!({
            "error": status.as_str(),
            "message": self.to_string(),
        });

        (status, Json(error_response)).into_response()
    }
}

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

impl From<UserError> for GatewayError {
    fn from(error: UserError) -> Self {
        match error {
            UserError::UserNotFound => GatewayError::NotFound("User not found".to_string()),
            UserError::UsernameTaken => {
                GatewayError::Conflict("Username is already taken".to_string())
            }
            UserError::EmailTaken => GatewayError::Conflict("Email is already taken".to_string()),
            UserError::InvalidUsername(reason) => GatewayError::InvalidRequest(reason),
            UserError::InvalidEmail => {
                GatewayError::InvalidRequest("Invalid email format".to_string())
            }
            UserError::InvalidPasswordHash => {
                GatewayError::InternalError("Stored credentials are unreadable".to_string())
            }
            UserError::DatabaseError(msg) => GatewayError::DatabaseError(msg),
            UserError::SerializationError(msg) => GatewayError::InternalError(msg),
        }
    }
}

impl From<ChatError> for GatewayError {
    fn from(error: ChatError) -> Self {
        match error {
            ChatError::RoomNotFound => GatewayError::NotFound("Room not found".to_string()),
            ChatError::RoomAlreadyExists => {
                GatewayError::Conflict("Room name is already taken".to_string())
            }
            ChatError::MessageNotFound => GatewayError::NotFound("Message not found".to_string()),
            ChatError::DatabaseError(msg) => GatewayError::DatabaseError(msg),
        }
    }
}

impl From<AuthError> for GatewayError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::TokenExpired | AuthError::TokenInvalid => {
                GatewayError::AuthenticationFailed(error.to_string())
            }
            AuthError::SigningFailed(msg) => GatewayError::InternalError(msg),
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(error: serde_json::Error) -> Self {
        GatewayError::InternalError(format!("JSON serialization error: {error}"))
    }
}
