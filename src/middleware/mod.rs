//! Middleware for the API
//!
//! Request tracing, security headers, and the authentication extractors.

pub mod auth;
mod security;
mod tracing;

pub use auth::AdminActor;
pub use security::{hsts_header, security_headers};
pub use tracing::request_tracing;
