//! Loan application route definitions

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::*;
use crate::state::AppState;

pub fn loan_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/loans",
            get(list_my_loan_applications).post(create_loan_application),
        )
        .route(
            "/api/loans/:id",
            get(get_loan_application).put(update_loan_application),
        )
        .route("/api/loans/:id/cancel", post(cancel_loan_application))
        .route("/api/admin/loans", get(admin_list_loan_applications))
        .route(
            "/api/admin/loans/:id",
            get(admin_get_loan_application)
                .put(admin_update_loan_application)
                .delete(admin_delete_loan_application),
        )
        .route(
            "/api/admin/loans/:id/history",
            get(admin_loan_application_history),
        )
}
