//! Per-application discussion threads

pub mod model;
pub mod service;

pub use model::{CreateMessageRequest, MessageView};
pub use service::MessageService;
