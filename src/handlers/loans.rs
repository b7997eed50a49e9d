//! Loan application handlers
//!
//! Thin HTTP glue: extract the actor, delegate to the service, serialize the
//! result. All business rules live in the service and transition engine.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::authz::Actor;
use crate::error::ApiResult;
use crate::loans::model::{
    AdminUpdateLoanRequest, CreateLoanApplicationRequest, ListLoansQuery, LoanApplication,
    StatusHistoryEntry, UpdateLoanApplicationRequest,
};
use crate::middleware::AdminActor;
use crate::state::AppState;

// ===== Applicant surface =====

/// Submit a new loan application
pub async fn create_loan_application(
    State(state): State<AppState>,
    actor: Actor,
    Json(request): Json<CreateLoanApplicationRequest>,
) -> ApiResult<(StatusCode, Json<LoanApplication>)> {
    let app = state.loans.create(&actor, request).await?;
    Ok((StatusCode::CREATED, Json(app)))
}

/// List the actor's own applications, newest first
pub async fn list_my_loan_applications(
    State(state): State<AppState>,
    actor: Actor,
) -> ApiResult<Json<Vec<LoanApplication>>> {
    let apps = state.loans.list_own(&actor).await?;
    Ok(Json(apps))
}

/// Fetch one visible application
pub async fn get_loan_application(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> ApiResult<Json<LoanApplication>> {
    let app = state.loans.get_for_actor(&actor, id).await?;
    Ok(Json(app))
}

/// Update an own application's fields while pending or rejected
pub async fn update_loan_application(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
    Json(request): Json<UpdateLoanApplicationRequest>,
) -> ApiResult<Json<LoanApplication>> {
    let app = state.loans.update_own(&actor, id, request).await?;
    Ok(Json(app))
}

/// Cancel an own application while pending or approved
pub async fn cancel_loan_application(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> ApiResult<Json<LoanApplication>> {
    let app = state.loans.cancel(&actor, id).await?;
    Ok(Json(app))
}

// ===== Administrative surface =====

/// List all applications with optional filters
pub async fn admin_list_loan_applications(
    State(state): State<AppState>,
    AdminActor(_admin): AdminActor,
    Query(query): Query<ListLoansQuery>,
) -> ApiResult<Json<Vec<LoanApplication>>> {
    let apps = state.loans.list_all(&query).await?;
    Ok(Json(apps))
}

/// Fetch any application
pub async fn admin_get_loan_application(
    State(state): State<AppState>,
    AdminActor(admin): AdminActor,
    Path(id): Path<i64>,
) -> ApiResult<Json<LoanApplication>> {
    let app = state.loans.get_for_actor(&admin, id).await?;
    Ok(Json(app))
}

/// Update any field, with status changes checked by the transition engine
pub async fn admin_update_loan_application(
    State(state): State<AppState>,
    AdminActor(admin): AdminActor,
    Path(id): Path<i64>,
    Json(request): Json<AdminUpdateLoanRequest>,
) -> ApiResult<Json<LoanApplication>> {
    let app = state.loans.admin_update(&admin, id, request).await?;
    Ok(Json(app))
}

/// Delete an application, notifying the applicant best-effort
pub async fn admin_delete_loan_application(
    State(state): State<AppState>,
    AdminActor(_admin): AdminActor,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.loans.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Read an application's status history, oldest first
pub async fn admin_loan_application_history(
    State(state): State<AppState>,
    AdminActor(admin): AdminActor,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vec<StatusHistoryEntry>>> {
    let entries = state.loans.history(&admin, id).await?;
    Ok(Json(entries))
}
