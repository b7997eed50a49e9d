//! Token verification
//!
//! Token issuance (registration, login, refresh) belongs to the identity
//! service; this backend only verifies bearer tokens signed with the shared
//! secret and resolves the acting user.

pub mod jwt;

pub use jwt::{verify_token, Claims, JwtError};
