//! Loan application models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use validator::{Validate, ValidationError};

/// Loan application lifecycle status
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "loan_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    Pending,
    Approved,
    Rejected,
    Disbursed,
    Completed,
    Cancelled,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Pending => "pending",
            LoanStatus::Approved => "approved",
            LoanStatus::Rejected => "rejected",
            LoanStatus::Disbursed => "disbursed",
            LoanStatus::Completed => "completed",
            LoanStatus::Cancelled => "cancelled",
        }
    }

    /// Display label used in notifications to applicants
    pub fn label_fr(&self) -> &'static str {
        match self {
            LoanStatus::Pending => "En attente",
            LoanStatus::Approved => "Approuvé",
            LoanStatus::Rejected => "Rejeté",
            LoanStatus::Disbursed => "Décaissé",
            LoanStatus::Completed => "Terminé",
            LoanStatus::Cancelled => "Annulé",
        }
    }

    /// Terminal states accept no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoanStatus::Completed | LoanStatus::Cancelled)
    }

    /// Decision states require an administrative comment on entry
    pub fn is_decision(&self) -> bool {
        matches!(self, LoanStatus::Approved | LoanStatus::Rejected)
    }
}

/// Loan categories
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "loan_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LoanType {
    Personal,
    Housing,
    Vehicle,
    Education,
    Other,
}

impl LoanType {
    pub fn label_fr(&self) -> &'static str {
        match self {
            LoanType::Personal => "Prêt Personnel",
            LoanType::Housing => "Prêt Immobilier",
            LoanType::Vehicle => "Prêt Véhicule",
            LoanType::Education => "Prêt Étudiant",
            LoanType::Other => "Autre",
        }
    }
}

/// Loan application model
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct LoanApplication {
    pub id: i64,
    /// Human-readable dossier number, generated once at creation
    pub dossier_number: String,
    pub applicant_id: i64,
    pub amount_requested: Decimal,
    pub loan_type: LoanType,
    pub repayment_period_months: i32,
    pub purpose: String,
    /// Only used for housing loans
    pub property_address: Option<String>,
    pub status: LoanStatus,
    pub admin_comments: String,
    pub amount_approved: Option<Decimal>,
    pub decided_by: Option<i64>,
    pub date_submitted: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
    /// Set once, the first time status leaves `pending`; never cleared
    pub date_decided: Option<DateTime<Utc>>,
}

/// Append-only audit record of one status transition
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct StatusHistoryEntry {
    pub id: i64,
    pub application_id: i64,
    pub status: LoanStatus,
    pub comment: Option<String>,
    pub changed_by: Option<i64>,
    pub created_at: DateTime<Utc>,
}

fn validate_positive_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if *amount <= Decimal::ZERO {
        return Err(ValidationError::new("amount_must_be_positive"));
    }
    Ok(())
}

/// Request to submit a new loan application
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLoanApplicationRequest {
    #[validate(custom = "validate_positive_amount")]
    pub amount_requested: Decimal,
    pub loan_type: Option<LoanType>,
    #[validate(range(min = 1, max = 360))]
    pub repayment_period_months: i32,
    #[validate(length(max = 2000))]
    pub purpose: Option<String>,
    #[validate(length(max = 500))]
    pub property_address: Option<String>,
}

/// Applicant-side update of a pending or rejected application
///
/// Status, administrative comment, and approved amount are not accepted here;
/// those fields belong to the administrative surface.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateLoanApplicationRequest {
    #[validate(custom = "validate_positive_amount")]
    pub amount_requested: Option<Decimal>,
    pub loan_type: Option<LoanType>,
    #[validate(range(min = 1, max = 360))]
    pub repayment_period_months: Option<i32>,
    #[validate(length(max = 2000))]
    pub purpose: Option<String>,
    #[validate(length(max = 500))]
    pub property_address: Option<String>,
}

/// Administrative update, including status transitions
#[derive(Debug, Deserialize, Validate)]
pub struct AdminUpdateLoanRequest {
    pub status: Option<LoanStatus>,
    #[validate(length(max = 2000))]
    pub admin_comments: Option<String>,
    #[validate(custom = "validate_positive_amount")]
    pub amount_approved: Option<Decimal>,
    #[validate(custom = "validate_positive_amount")]
    pub amount_requested: Option<Decimal>,
    pub loan_type: Option<LoanType>,
    #[validate(range(min = 1, max = 360))]
    pub repayment_period_months: Option<i32>,
    #[validate(length(max = 2000))]
    pub purpose: Option<String>,
    #[validate(length(max = 500))]
    pub property_address: Option<String>,
}

/// Query for the administrative listing
#[derive(Debug, Deserialize, Default)]
pub struct ListLoansQuery {
    pub status: Option<LoanStatus>,
    pub loan_type: Option<LoanType>,
    pub applicant_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(LoanStatus::Completed.is_terminal());
        assert!(LoanStatus::Cancelled.is_terminal());
        assert!(!LoanStatus::Pending.is_terminal());
        assert!(!LoanStatus::Approved.is_terminal());
        assert!(!LoanStatus::Rejected.is_terminal());
        assert!(!LoanStatus::Disbursed.is_terminal());
    }

    #[test]
    fn test_decision_states() {
        assert!(LoanStatus::Approved.is_decision());
        assert!(LoanStatus::Rejected.is_decision());
        assert!(!LoanStatus::Pending.is_decision());
        assert!(!LoanStatus::Cancelled.is_decision());
    }

    #[test]
    fn test_create_request_rejects_non_positive_amount() {
        let request = CreateLoanApplicationRequest {
            amount_requested: Decimal::ZERO,
            loan_type: Some(LoanType::Personal),
            repayment_period_months: 12,
            purpose: None,
            property_address: None,
        };
        assert!(request.validate().is_err());

        let request = CreateLoanApplicationRequest {
            amount_requested: Decimal::from(500_000),
            loan_type: Some(LoanType::Personal),
            repayment_period_months: 12,
            purpose: None,
            property_address: None,
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_create_request_rejects_bad_period() {
        let request = CreateLoanApplicationRequest {
            amount_requested: Decimal::from(1000),
            loan_type: None,
            repayment_period_months: 0,
            purpose: None,
            property_address: None,
        };
        assert!(request.validate().is_err());
    }
}
