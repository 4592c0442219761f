//! Room endpoints: creation, membership and derived kind

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use parley_chats::Room;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::gateway::error::GatewayResult;
use crate::gateway::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateRoomRequest {
    pub name: String,
    /// Username of the creator; they become the first member.
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct MembershipRequest {
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct RoomResponse {
    pub id: i64,
    pub name: String,
    pub kind: String,
    pub members: Vec<String>,
    pub created_at: String,
}

pub fn create_room_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/rooms", post(create_room))
        .route("/rooms/:name", get(get_room).delete(delete_room))
        .route("/rooms/:name/join", post(join_room))
        .route("/rooms/:name/leave", post(leave_room))
}

async fn room_response(state: &AppState, room: Room) -> GatewayResult<RoomResponse> {
    let kind = state.room_service.kind(&room.name).await?;
    let members = state.room_service.members(&room.name).await?;

    Ok(RoomResponse {
        id: room.id,
        name: room.name,
        kind: kind.as_str().to_string(),
        members,
        created_at: room.created_at,
    })
}

async fn create_room(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateRoomRequest>,
) -> GatewayResult<Json<RoomResponse>> {
    let user = state
        .user_service
        .get_user_by_username(&request.username)
        .await?;

    let room = state.room_service.create_room(&request.name).await?;
    state.room_service.join(&room.name, user.id).await?;

    let response = room_response(&state, room).await?;
    Ok(Json(response))
}

async fn get_room(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> GatewayResult<Json<RoomResponse>> {
    let room = state.room_service.get_room(&name).await?;
    let response = room_response(&state, room).await?;
    Ok(Json(response))
}

async fn delete_room(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> GatewayResult<Json<serde_json::Value>> {
    state.room_service.delete_room(&name).await?;
    Ok(Json(serde_json::json!({ "status": "deleted" })))
}

async fn join_room(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(request): Json<MembershipRequest>,
) -> GatewayResult<Json<serde_json::Value>> {
    let user = state
        .user_service
        .get_user_by_username(&request.username)
        .await?;
    state.room_service.join(&name, user.id).await?;
    Ok(Json(serde_json::json!({ "status": "ok" })))
}

async fn leave_room(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(request): Json<MembershipRequest>,
) -> GatewayResult<Json<serde_json::Value>> {
    let user = state
        .user_service
        .get_user_by_username(&request.username)
        .await?;
    state.room_service.leave(&name, user.id).await?;
    Ok(Json(serde_json::json!({ "status": "ok" })))
}
