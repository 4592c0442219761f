//! HTTP and WebSocket gateway for the Parley backend.
//!
//! Routes REST requests to the domain services and streams committed
//! chat events out over a WebSocket. All state mutations go through
//! the services; the gateway never touches the database directly.

pub mod error;
pub mod rest;
#[cfg(test)]
mod tests;
pub mod websocket;

use axum::{http::Method, routing::get, Router};
use parley_chats::{ChatEvent, MessageService, RoomService};
use parley_users::UserService;
use std::sync::Arc;
use tokio::sync::broadcast;
use tower_http::cors::{Any, CorsLayer};

use crate::runtime::BackendServices;

pub use error::{GatewayError, GatewayResult};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub room_service: RoomService,
    pub message_service: MessageService,
    pub events: broadcast::Sender<ChatEvent>,
}

impl AppState {
    pub fn from_services(services: &BackendServices) -> Self {
        Self {
            user_service: services.user_service.clone(),
            room_service: services.room_service.clone(),
            message_service: services.message_service.clone(),
            events: services.events.clone(),
        }
    }
}

/// Create the main application router with all routes
pub fn create_router(state: AppState) -> Router {
    let arc_state = Arc::new(state);

    Router::new()
        .route("/health", get(rest::health_check))
        .nest("/api/v1.0", rest::create_rest_routes())
        .merge(websocket::create_websocket_routes())
        .with_state(arc_state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_headers(Any),
        )
}
