//! Attachment handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::attachments::model::{Attachment, CreateAttachmentRequest};
use crate::authz::Actor;
use crate::error::ApiResult;
use crate::state::AppState;

/// List a visible application's attachments
pub async fn list_application_attachments(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vec<Attachment>>> {
    let attachments = state.attachments.list_for_application(&actor, id).await?;
    Ok(Json(attachments))
}

/// Register an attachment record under a visible application
pub async fn add_application_attachment(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
    Json(request): Json<CreateAttachmentRequest>,
) -> ApiResult<(StatusCode, Json<Attachment>)> {
    let attachment = state.attachments.add(&actor, id, request).await?;
    Ok((StatusCode::CREATED, Json(attachment)))
}
