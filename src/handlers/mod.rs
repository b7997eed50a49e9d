//! API handlers

mod attachments;
mod health;
mod loans;
mod messages;
mod users;

pub use attachments::*;
pub use health::*;
pub use loans::*;
pub use messages::*;
pub use users::*;
