//! Attachment models
//!
//! File content never passes through this backend; the external store hands
//! out an opaque `storage_key` and we only track the reference.

use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use validator::Validate;

/// Attachment record
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Attachment {
    pub id: i64,
    pub application_id: i64,
    pub name: String,
    pub storage_key: String,
    pub added_at: DateTime<Utc>,
}

/// Request to register an attachment under an application
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAttachmentRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1, max = 512))]
    pub storage_key: String,
}
