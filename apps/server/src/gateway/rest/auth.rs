//! Registration and login endpoints

use axum::{extract::State, routing::post, Json, Router};
use parley_database::UserProfile;
use parley_users::RegisterRequest;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::gateway::error::{GatewayError, GatewayResult};
use crate::gateway::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub user: UserProfile,
}

pub fn create_auth_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> GatewayResult<Json<SessionResponse>> {
    let user = state.user_service.register(request).await?;
    let token = state.user_service.encode_auth_token(user.id)?;

    Ok(Json(SessionResponse {
        token,
        user: UserProfile::from(&user),
    }))
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> GatewayResult<Json<SessionResponse>> {
    let valid = state
        .user_service
        .check_password(&request.username, &request.password)
        .await
        .map_err(|_| invalid_credentials())?;
    if !valid {
        return Err(invalid_credentials());
    }

    let user = state
        .user_service
        .get_user_by_username(&request.username)
        .await?;

    state.user_service.set_active(user.id, true).await?;
    state.user_service.touch_last_seen(user.id).await?;

    let token = state.user_service.encode_auth_token(user.id)?;

    info!(user_id = user.id, "user logged in");

    Ok(Json(SessionResponse {
        token,
        user: UserProfile::from(&user),
    }))
}

#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    pub token: String,
}

/// Close a session: the token names the user going offline.
async fn logout(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LogoutRequest>,
) -> GatewayResult<Json<serde_json::Value>> {
    let user_id = state.user_service.decode_auth_token(&request.token)?;
    state.user_service.set_active(user_id, false).await?;

    info!(user_id, "user logged out");

    Ok(Json(serde_json::json!({ "status": "ok" })))
}

// A failed login never reveals whether the username or the password
// was wrong.
fn invalid_credentials() -> GatewayError {
    GatewayError::AuthenticationFailed("Invalid username or password".to_string())
}
