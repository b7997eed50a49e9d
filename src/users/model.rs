//! User models

use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use validator::Validate;

/// User roles
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Fonctionnaire,
    Administrateur,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Fonctionnaire => "fonctionnaire",
            UserRole::Administrateur => "administrateur",
        }
    }
}

/// User model
///
/// Accounts are created and activated by the identity service; this backend
/// only reads them and lets administrators manage flags and roles.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub cin_number: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_verified: bool,
    pub date_joined: DateTime<Utc>,
}

/// Self-service profile update
///
/// Email, role, and verification flags are read-only on this surface.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(max = 100))]
    pub first_name: Option<String>,
    #[validate(length(max = 100))]
    pub last_name: Option<String>,
    #[validate(length(max = 20))]
    pub phone_number: Option<String>,
    #[validate(length(min = 1, max = 20))]
    pub cin_number: Option<String>,
}

/// Administrative user update
#[derive(Debug, Deserialize, Validate)]
pub struct AdminUpdateUserRequest {
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
    pub is_staff: Option<bool>,
    pub is_superuser: Option<bool>,
    pub is_verified: Option<bool>,
    #[validate(length(max = 100))]
    pub first_name: Option<String>,
    #[validate(length(max = 100))]
    pub last_name: Option<String>,
    #[validate(length(max = 20))]
    pub phone_number: Option<String>,
    #[validate(length(min = 1, max = 20))]
    pub cin_number: Option<String>,
}
