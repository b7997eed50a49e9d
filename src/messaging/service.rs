//! Messaging service layer
//!
//! Threads inherit the visibility rule of their parent application: the
//! owning applicant and any administrator. Reads on a foreign application
//! resolve to not-found; a write attempt is a permission error.

use sqlx::PgPool;
use validator::Validate;

use super::model::{CreateMessageRequest, MessageView};
use crate::authz::{self, Actor, Operation};
use crate::error::{ApiError, ApiResult};
use crate::loans::model::LoanApplication;

#[derive(Clone)]
pub struct MessageService {
    pool: PgPool,
}

impl MessageService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_application(&self, id: i64) -> ApiResult<Option<LoanApplication>> {
        let app = sqlx::query_as::<_, LoanApplication>(
            "SELECT * FROM loan_applications WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(app)
    }

    /// List an application's thread, oldest first
    pub async fn list_for_application(
        &self,
        actor: &Actor,
        application_id: i64,
    ) -> ApiResult<Vec<MessageView>> {
        match self.fetch_application(application_id).await? {
            Some(app) if authz::can(actor, Operation::Read, &app) => {}
            _ => return Err(ApiError::NotFound("Loan application not found".to_string())),
        }

        let messages = sqlx::query_as::<_, MessageView>(
            r#"
            SELECT m.id, m.application_id, m.author_id, u.email AS author_email,
                   m.body, m.sent_at, m.read
            FROM messages m
            JOIN users u ON u.id = m.author_id
            WHERE m.application_id = $1
            ORDER BY m.sent_at ASC
            "#,
        )
        .bind(application_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    /// Append a message to an application's thread
    pub async fn post(
        &self,
        actor: &Actor,
        application_id: i64,
        request: CreateMessageRequest,
    ) -> ApiResult<MessageView> {
        let app = self
            .fetch_application(application_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Loan application not found".to_string()))?;

        if !authz::can(actor, Operation::Message, &app) {
            return Err(ApiError::Forbidden(
                "You cannot post a message on an application that does not belong to you"
                    .to_string(),
            ));
        }

        request.validate()?;

        let message = sqlx::query_as::<_, MessageView>(
            r#"
            WITH inserted AS (
                INSERT INTO messages (application_id, author_id, body)
                VALUES ($1, $2, $3)
                RETURNING *
            )
            SELECT i.id, i.application_id, i.author_id, u.email AS author_email,
                   i.body, i.sent_at, i.read
            FROM inserted i
            JOIN users u ON u.id = i.author_id
            "#,
        )
        .bind(application_id)
        .bind(actor.id)
        .bind(&request.body)
        .fetch_one(&self.pool)
        .await?;

        Ok(message)
    }

    /// Cross-application listing: everything for an administrator, the
    /// actor's own authored messages otherwise.
    pub async fn list_mine(&self, actor: &Actor) -> ApiResult<Vec<MessageView>> {
        let messages = if actor.is_admin() {
            sqlx::query_as::<_, MessageView>(
                r#"
                SELECT m.id, m.application_id, m.author_id, u.email AS author_email,
                       m.body, m.sent_at, m.read
                FROM messages m
                JOIN users u ON u.id = m.author_id
                ORDER BY m.sent_at DESC
                "#,
            )
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, MessageView>(
                r#"
                SELECT m.id, m.application_id, m.author_id, u.email AS author_email,
                       m.body, m.sent_at, m.read
                FROM messages m
                JOIN users u ON u.id = m.author_id
                WHERE m.author_id = $1
                ORDER BY m.sent_at DESC
                "#,
            )
            .bind(actor.id)
            .fetch_all(&self.pool)
            .await?
        };

        Ok(messages)
    }
}
