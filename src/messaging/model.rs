//! Messaging models

use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use validator::Validate;

/// Message joined with its author's email for API responses
///
/// Threads are append-only, no edit or delete.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct MessageView {
    pub id: i64,
    pub application_id: i64,
    pub author_id: i64,
    pub author_email: String,
    pub body: String,
    pub sent_at: DateTime<Utc>,
    pub read: bool,
}

/// Request to post a message on an application's thread
#[derive(Debug, Deserialize, Validate)]
pub struct CreateMessageRequest {
    #[validate(length(min = 1, max = 5000))]
    pub body: String,
}
