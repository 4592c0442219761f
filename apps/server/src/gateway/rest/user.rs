//! User profile, avatar, friendship and read-tracking endpoints

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use parley_database::UserProfile;
use serde::Deserialize;
use std::sync::Arc;

use crate::gateway::error::GatewayResult;
use crate::gateway::AppState;

#[derive(Debug, Deserialize)]
pub struct AvatarQuery {
    /// Requested image size in pixels
    #[serde(default = "default_avatar_size")]
    pub s: u32,
}

fn default_avatar_size() -> u32 {
    128
}

pub fn create_user_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users/:username", get(get_profile).delete(delete_user))
        .route("/users/:username/avatar", get(get_avatar))
        .route("/users/:username/friends", get(list_friends))
        .route(
            "/users/:username/friends/:other",
            post(add_friend).delete(remove_friend),
        )
        .route("/users/:username/contacts", get(list_contacts))
        .route("/users/:username/rooms/:name/view", post(view_room))
}

async fn get_profile(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> GatewayResult<Json<UserProfile>> {
    let user = state.user_service.get_user_by_username(&username).await?;
    Ok(Json(UserProfile::from(&user)))
}

async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> GatewayResult<Json<serde_json::Value>> {
    let user = state.user_service.get_user_by_username(&username).await?;
    state.user_service.delete_user(user.id).await?;
    Ok(Json(serde_json::json!({ "status": "deleted" })))
}

async fn get_avatar(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
    Query(query): Query<AvatarQuery>,
) -> GatewayResult<Json<serde_json::Value>> {
    let user = state.user_service.get_user_by_username(&username).await?;
    let url = state.user_service.avatar(user.id, query.s).await?;
    Ok(Json(serde_json::json!({ "url": url })))
}

async fn list_friends(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> GatewayResult<Json<Vec<String>>> {
    let user = state.user_service.get_user_by_username(&username).await?;
    let friends = state.user_service.friend_usernames(user.id).await?;
    Ok(Json(friends))
}

async fn add_friend(
    State(state): State<Arc<AppState>>,
    Path((username, other)): Path<(String, String)>,
) -> GatewayResult<Json<serde_json::Value>> {
    let user = state.user_service.get_user_by_username(&username).await?;
    let other = state.user_service.get_user_by_username(&other).await?;
    state.user_service.add_friend(user.id, other.id).await?;
    Ok(Json(serde_json::json!({ "status": "ok" })))
}

async fn remove_friend(
    State(state): State<Arc<AppState>>,
    Path((username, other)): Path<(String, String)>,
) -> GatewayResult<Json<serde_json::Value>> {
    let user = state.user_service.get_user_by_username(&username).await?;
    let other = state.user_service.get_user_by_username(&other).await?;
    state.user_service.delete_friend(user.id, other.id).await?;
    Ok(Json(serde_json::json!({ "status": "ok" })))
}

async fn list_contacts(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> GatewayResult<Json<Vec<String>>> {
    let user = state.user_service.get_user_by_username(&username).await?;
    let contacts = state.room_service.contacts(user.id).await?;
    Ok(Json(contacts))
}

async fn view_room(
    State(state): State<Arc<AppState>>,
    Path((username, name)): Path<(String, String)>,
) -> GatewayResult<Json<serde_json::Value>> {
    let user = state.user_service.get_user_by_username(&username).await?;
    state.user_service.view_room(user.id, &name).await?;
    Ok(Json(serde_json::json!({ "status": "ok" })))
}
