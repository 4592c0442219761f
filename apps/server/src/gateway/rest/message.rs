//! Message endpoints

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use parley_chats::MessageView;
use serde::Deserialize;
use std::sync::Arc;

use crate::gateway::error::GatewayResult;
use crate::gateway::AppState;

const DEFAULT_RECENT_LIMIT: i64 = 50;

#[derive(Debug, Deserialize)]
pub struct ListMessagesQuery {
    /// Room to list; when absent the most recent messages across all
    /// rooms are returned.
    pub room: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateMessageRequest {
    pub roomname: String,
    pub username: String,
    pub text: String,
}

pub fn create_message_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/message", get(list_messages).post(create_message))
        .route("/message/:id", get(get_message))
}

async fn list_messages(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListMessagesQuery>,
) -> GatewayResult<Json<Vec<MessageView>>> {
    let messages = match query.room {
        Some(room) => state.message_service.list_for_room(&room).await?,
        None => {
            let limit = query.limit.unwrap_or(DEFAULT_RECENT_LIMIT);
            state.message_service.recent(limit).await?
        }
    };

    Ok(Json(messages))
}

async fn create_message(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateMessageRequest>,
) -> GatewayResult<Json<MessageView>> {
    // The author must exist even though messages only store the name.
    let user = state
        .user_service
        .get_user_by_username(&request.username)
        .await?;

    let view = state
        .message_service
        .post(&request.roomname, &user.username, &request.text)
        .await?;

    Ok(Json(view))
}

async fn get_message(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> GatewayResult<Json<MessageView>> {
    let view = state.message_service.get(id).await?;
    Ok(Json(view))
}
