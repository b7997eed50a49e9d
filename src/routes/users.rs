//! User route definitions

use axum::{routing::get, Router};

use crate::handlers::*;
use crate::state::AppState;

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/api/users/me", get(get_my_profile).put(update_my_profile))
        .route("/api/admin/users", get(admin_list_users))
        .route(
            "/api/admin/users/:id",
            get(admin_get_user)
                .put(admin_update_user)
                .delete(admin_delete_user),
        )
}
