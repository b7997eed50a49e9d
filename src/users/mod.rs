//! User accounts and profile management

pub mod model;
pub mod service;

pub use model::{AdminUpdateUserRequest, UpdateProfileRequest, User, UserRole};
pub use service::UserService;
