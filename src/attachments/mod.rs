//! Supporting-document records attached to loan applications

pub mod model;
pub mod service;

pub use model::{Attachment, CreateAttachmentRequest};
pub use service::AttachmentService;
