//! Route definitions for the API

mod attachments;
mod loans;
mod messages;
mod users;

use axum::{routing::get, Router};

pub use attachments::attachment_routes;
pub use loans::loan_routes;
pub use messages::message_routes;
pub use users::user_routes;

use crate::handlers::{health_check, root};
use crate::middleware;
use crate::state::AppState;

/// Assemble the full application router.
///
/// CORS is layered on in `main`, where the allowed origins come from
/// configuration.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .merge(loan_routes())
        .merge(message_routes())
        .merge(attachment_routes())
        .merge(user_routes())
        .with_state(state)
        .layer(axum::middleware::from_fn(middleware::security_headers))
        .layer(axum::middleware::from_fn(middleware::request_tracing))
}
