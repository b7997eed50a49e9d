//! Loan applications: models, status transition engine, and service layer

pub mod model;
pub mod service;
pub mod transition;

pub use model::{
    AdminUpdateLoanRequest, CreateLoanApplicationRequest, ListLoansQuery, LoanApplication,
    LoanStatus, LoanType, StatusHistoryEntry, UpdateLoanApplicationRequest,
};
pub use service::LoanService;
pub use transition::{validate_transition, TransitionError};
