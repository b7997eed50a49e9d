//! Attachment route definitions

use axum::{routing::get, Router};

use crate::handlers::*;
use crate::state::AppState;

pub fn attachment_routes() -> Router<AppState> {
    Router::new().route(
        "/api/loans/:id/attachments",
        get(list_application_attachments).post(add_application_attachment),
    )
}
