//! Messaging handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::authz::Actor;
use crate::error::ApiResult;
use crate::messaging::model::{CreateMessageRequest, MessageView};
use crate::state::AppState;

/// List an application's discussion thread
pub async fn list_application_messages(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vec<MessageView>>> {
    let messages = state.messages.list_for_application(&actor, id).await?;
    Ok(Json(messages))
}

/// Post a message on an application's thread
pub async fn post_application_message(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
    Json(request): Json<CreateMessageRequest>,
) -> ApiResult<(StatusCode, Json<MessageView>)> {
    let message = state.messages.post(&actor, id, request).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// Cross-application listing: all messages for an administrator, own
/// authored messages for a fonctionnaire
pub async fn list_my_messages(
    State(state): State<AppState>,
    actor: Actor,
) -> ApiResult<Json<Vec<MessageView>>> {
    let messages = state.messages.list_mine(&actor).await?;
    Ok(Json(messages))
}
