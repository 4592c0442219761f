//! REST API endpoints for the gateway

pub mod auth;
pub mod message;
pub mod room;
pub mod user;

use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;

use crate::gateway::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Create all REST API routes
pub fn create_rest_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(auth::create_auth_routes())
        .merge(user::create_user_routes())
        .merge(room::create_room_routes())
        .merge(message::create_message_routes())
}
