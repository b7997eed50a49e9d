//! Authentication middleware
//!
//! Extractors that verify the bearer token, resolve the current user row,
//! and hand the request an [`Actor`]. Authorization failures surface before
//! any business validation runs.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use serde::Serialize;

use crate::auth::verify_token;
use crate::authz::Actor;
use crate::state::AppState;
use crate::users::model::{User, UserRole};

/// Error response for authentication failures
#[derive(Debug, Serialize)]
struct AuthRejection {
    error: AuthRejectionDetails,
}

#[derive(Debug, Serialize)]
struct AuthRejectionDetails {
    code: String,
    message: String,
}

impl AuthRejection {
    fn response(status: StatusCode, code: &str, message: &str) -> Response {
        let body = AuthRejection {
            error: AuthRejectionDetails {
                code: code.to_string(),
                message: message.to_string(),
            },
        };
        (status, Json(body)).into_response()
    }

    fn unauthorized(code: &str, message: &str) -> Response {
        Self::response(StatusCode::UNAUTHORIZED, code, message)
    }
}

/// Extractor producing the authenticated actor for a request.
///
/// Verifies the HS256 bearer token, then re-resolves the user row so role
/// and flags always reflect current state, not what was true at issuance.
#[async_trait]
impl<S> FromRequestParts<S> for Actor
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| {
                    AuthRejection::unauthorized(
                        "MISSING_TOKEN",
                        "Authorization header with Bearer token required",
                    )
                })?;

        let app_state = AppState::from_ref(state);

        let claims =
            verify_token(bearer.token(), &app_state.config.jwt_secret).map_err(|e| {
                if e.to_string().contains("expired") {
                    AuthRejection::unauthorized("TOKEN_EXPIRED", "Token has expired")
                } else {
                    AuthRejection::unauthorized("INVALID_TOKEN", "Invalid token")
                }
            })?;

        if claims.token_type != "access" {
            return Err(AuthRejection::unauthorized(
                "INVALID_TOKEN_TYPE",
                "Expected access token",
            ));
        }

        let user_id: i64 = claims.sub.parse().map_err(|_| {
            AuthRejection::unauthorized("INVALID_TOKEN", "Invalid user id in token")
        })?;

        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&app_state.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to resolve user for token");
                AuthRejection::response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Could not resolve the authenticated user",
                )
            })?
            .ok_or_else(|| AuthRejection::unauthorized("INVALID_TOKEN", "Unknown user"))?;

        if !user.is_active {
            return Err(AuthRejection::response(
                StatusCode::FORBIDDEN,
                "ACCOUNT_DISABLED",
                "Your account has been disabled by the administrator",
            ));
        }

        Ok(Actor::from_user(&user))
    }
}

/// Extractor restricting a route to administrators
pub struct AdminActor(pub Actor);

#[async_trait]
impl<S> FromRequestParts<S> for AdminActor
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let actor = Actor::from_request_parts(parts, state).await?;

        if actor.role != UserRole::Administrateur {
            return Err(AuthRejection::response(
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "Administrator access required",
            ));
        }

        Ok(AdminActor(actor))
    }
}
