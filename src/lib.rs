//! Loan-application management backend
//!
//! A backend for a public-sector lending platform: fonctionnaires submit
//! loan applications with supporting documents and exchange messages about
//! them; administrators review, decide, and track status transitions. The
//! core is the guarded loan status lifecycle in [`loans::transition`], the
//! capability checks in [`authz`], and the post-commit notification
//! dispatcher in [`notify`].

pub mod attachments;
pub mod auth;
pub mod authz;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod loans;
pub mod messaging;
pub mod middleware;
pub mod notify;
pub mod routes;
pub mod state;
pub mod users;
