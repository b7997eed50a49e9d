//! User profile and administrative user-management handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::authz::Actor;
use crate::error::ApiResult;
use crate::middleware::AdminActor;
use crate::state::AppState;
use crate::users::model::{AdminUpdateUserRequest, UpdateProfileRequest, User};

/// Read the acting user's own profile
pub async fn get_my_profile(
    State(state): State<AppState>,
    actor: Actor,
) -> ApiResult<Json<User>> {
    let user = state.users.get_by_id(actor.id).await?;
    Ok(Json(user))
}

/// Update the acting user's own profile fields
pub async fn update_my_profile(
    State(state): State<AppState>,
    actor: Actor,
    Json(request): Json<UpdateProfileRequest>,
) -> ApiResult<Json<User>> {
    let user = state.users.update_profile(actor.id, request).await?;
    Ok(Json(user))
}

/// List all users, ordered by email
pub async fn admin_list_users(
    State(state): State<AppState>,
    AdminActor(_admin): AdminActor,
) -> ApiResult<Json<Vec<User>>> {
    let users = state.users.list().await?;
    Ok(Json(users))
}

/// Fetch one user
pub async fn admin_get_user(
    State(state): State<AppState>,
    AdminActor(_admin): AdminActor,
    Path(id): Path<i64>,
) -> ApiResult<Json<User>> {
    let user = state.users.get_by_id(id).await?;
    Ok(Json(user))
}

/// Update a user's role, flags, or profile fields
pub async fn admin_update_user(
    State(state): State<AppState>,
    AdminActor(admin): AdminActor,
    Path(id): Path<i64>,
    Json(request): Json<AdminUpdateUserRequest>,
) -> ApiResult<Json<User>> {
    let user = state.users.admin_update(&admin, id, request).await?;
    Ok(Json(user))
}

/// Delete a user account
pub async fn admin_delete_user(
    State(state): State<AppState>,
    AdminActor(_admin): AdminActor,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.users.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
