//! Authorization gate
//!
//! A typed capability check, independent of the transport layer. Every entry
//! point that touches a loan application (or one of its child records) calls
//! `can` with the acting user, the requested operation, and the target record.
//!
//! Fonctionnaires only ever see their own applications; a foreign id must
//! surface as not-found, never as forbidden, so handlers must not leak the
//! distinction between "exists but not yours" and "does not exist".

use thiserror::Error;

use crate::error::ApiError;
use crate::loans::model::{LoanApplication, LoanStatus};
use crate::users::model::{User, UserRole};

/// The authenticated actor attached to a request
///
/// Resolved by the auth extractor from the bearer token and the current user
/// row; by the time an Actor exists, the account is known to be active.
#[derive(Debug, Clone)]
pub struct Actor {
    pub id: i64,
    pub email: String,
    pub role: UserRole,
    pub has_cin: bool,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_verified: bool,
}

impl Actor {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            role: user.role,
            has_cin: user.cin_number.as_deref().is_some_and(|c| !c.is_empty()),
            is_active: user.is_active,
            is_staff: user.is_staff,
            is_superuser: user.is_superuser,
            is_verified: user.is_verified,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Administrateur
    }
}

/// Operations gated on a loan application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    UpdateFields,
    UpdateStatus,
    Cancel,
    Delete,
    Message,
}

/// Reasons a submission is refused before any record is created
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CreateDenied {
    #[error("A CIN number must be set on your profile before submitting a loan application")]
    MissingCin,

    #[error("Only fonctionnaires may submit loan applications")]
    NotFonctionnaire,
}

impl From<CreateDenied> for ApiError {
    fn from(err: CreateDenied) -> Self {
        match err {
            CreateDenied::MissingCin => ApiError::ValidationError(err.to_string()),
            CreateDenied::NotFonctionnaire => ApiError::Forbidden(err.to_string()),
        }
    }
}

/// Gate for submitting a new application (no target record exists yet)
pub fn can_create(actor: &Actor) -> Result<(), CreateDenied> {
    if actor.role != UserRole::Fonctionnaire {
        return Err(CreateDenied::NotFonctionnaire);
    }
    if !actor.has_cin {
        return Err(CreateDenied::MissingCin);
    }
    Ok(())
}

/// Decide whether `actor` may perform `op` on `app`
pub fn can(actor: &Actor, op: Operation, app: &LoanApplication) -> bool {
    if !actor.is_active {
        return false;
    }

    if actor.is_admin() {
        // Administrators see and manage every application; status changes are
        // still subject to the transition engine.
        return true;
    }

    // Fonctionnaires act only on their own applications
    if app.applicant_id != actor.id {
        return false;
    }

    match op {
        Operation::Read | Operation::Message => true,
        Operation::UpdateFields => {
            matches!(app.status, LoanStatus::Pending | LoanStatus::Rejected)
        }
        Operation::Cancel => {
            matches!(app.status, LoanStatus::Pending | LoanStatus::Approved)
        }
        Operation::UpdateStatus | Operation::Delete => false,
    }
}
