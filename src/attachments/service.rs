//! Attachment service layer
//!
//! Attachments inherit the visibility rule of their parent application.

use sqlx::PgPool;
use validator::Validate;

use super::model::{Attachment, CreateAttachmentRequest};
use crate::authz::{self, Actor, Operation};
use crate::error::{ApiError, ApiResult};
use crate::loans::model::LoanApplication;

#[derive(Clone)]
pub struct AttachmentService {
    pool: PgPool,
}

impl AttachmentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn visible_application(
        &self,
        actor: &Actor,
        id: i64,
    ) -> ApiResult<LoanApplication> {
        let app = sqlx::query_as::<_, LoanApplication>(
            "SELECT * FROM loan_applications WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match app {
            Some(app) if authz::can(actor, Operation::Read, &app) => Ok(app),
            _ => Err(ApiError::NotFound("Loan application not found".to_string())),
        }
    }

    /// List a visible application's attachments, oldest first
    pub async fn list_for_application(
        &self,
        actor: &Actor,
        application_id: i64,
    ) -> ApiResult<Vec<Attachment>> {
        let app = self.visible_application(actor, application_id).await?;

        let attachments = sqlx::query_as::<_, Attachment>(
            "SELECT * FROM attachments WHERE application_id = $1 ORDER BY added_at ASC",
        )
        .bind(app.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(attachments)
    }

    /// Register an attachment record under a visible application
    pub async fn add(
        &self,
        actor: &Actor,
        application_id: i64,
        request: CreateAttachmentRequest,
    ) -> ApiResult<Attachment> {
        let app = self.visible_application(actor, application_id).await?;

        request.validate()?;

        let attachment = sqlx::query_as::<_, Attachment>(
            r#"
            INSERT INTO attachments (application_id, name, storage_key)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(app.id)
        .bind(&request.name)
        .bind(&request.storage_key)
        .fetch_one(&self.pool)
        .await?;

        Ok(attachment)
    }
}
