//! Messaging route definitions

use axum::{routing::get, Router};

use crate::handlers::*;
use crate::state::AppState;

pub fn message_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/loans/:id/messages",
            get(list_application_messages).post(post_application_message),
        )
        .route("/api/messages", get(list_my_messages))
}
