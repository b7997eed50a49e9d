//! Loan application service layer
//!
//! All status changes run inside one database transaction holding a
//! `SELECT ... FOR UPDATE` row lock: validation, field updates, decision
//! stamping, and the history append either all persist or none do. Two
//! administrators deciding the same application concurrently serialize on the
//! lock; the loser re-reads the committed row and re-validates against it.
//! Notifications go out strictly after commit and never affect the outcome.

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;
use validator::Validate;

use super::model::{
    AdminUpdateLoanRequest, CreateLoanApplicationRequest, ListLoansQuery, LoanApplication,
    LoanStatus, LoanType, StatusHistoryEntry, UpdateLoanApplicationRequest,
};
use super::transition::validate_transition;
use crate::authz::{self, Actor, Operation};
use crate::error::{ApiError, ApiResult};
use crate::notify::Notifier;

/// Attempts at allocating a dossier number before giving up
const DOSSIER_ALLOC_ATTEMPTS: u32 = 5;

/// Generate a human-readable dossier number: the first 8 hex characters of a
/// v4 UUID, uppercased. Uniqueness is enforced by the database; collisions
/// are retried by the caller.
pub fn generate_dossier_number() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_uppercase()
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

/// Loan application service
#[derive(Clone)]
pub struct LoanService {
    pool: PgPool,
    notifier: Notifier,
}

impl LoanService {
    pub fn new(pool: PgPool, notifier: Notifier) -> Self {
        Self { pool, notifier }
    }

    /// Submit a new application on behalf of the acting fonctionnaire
    pub async fn create(
        &self,
        actor: &Actor,
        request: CreateLoanApplicationRequest,
    ) -> ApiResult<LoanApplication> {
        authz::can_create(actor)?;
        request.validate()?;

        let loan_type = request.loan_type.unwrap_or(LoanType::Personal);
        let purpose = request.purpose.unwrap_or_default();

        // The dossier number is generated once and never regenerated; on the
        // rare unique-index collision we retry with a fresh token.
        for _ in 0..DOSSIER_ALLOC_ATTEMPTS {
            let dossier_number = generate_dossier_number();

            let result = sqlx::query_as::<_, LoanApplication>(
                r#"
                INSERT INTO loan_applications (
                    dossier_number, applicant_id, amount_requested, loan_type,
                    repayment_period_months, purpose, property_address, status
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending')
                RETURNING *
                "#,
            )
            .bind(&dossier_number)
            .bind(actor.id)
            .bind(request.amount_requested)
            .bind(loan_type)
            .bind(request.repayment_period_months)
            .bind(&purpose)
            .bind(&request.property_address)
            .fetch_one(&self.pool)
            .await;

            match result {
                Ok(app) => {
                    tracing::info!(
                        dossier = %app.dossier_number,
                        applicant = app.applicant_id,
                        "Loan application submitted"
                    );
                    return Ok(app);
                }
                Err(e) if is_unique_violation(&e) => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(ApiError::InternalError(
            "Could not allocate a unique dossier number".to_string(),
        ))
    }

    /// List the acting fonctionnaire's own applications, newest first
    pub async fn list_own(&self, actor: &Actor) -> ApiResult<Vec<LoanApplication>> {
        let apps = sqlx::query_as::<_, LoanApplication>(
            "SELECT * FROM loan_applications WHERE applicant_id = $1 ORDER BY date_submitted DESC",
        )
        .bind(actor.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(apps)
    }

    /// Administrative listing with optional filters, newest first
    pub async fn list_all(&self, query: &ListLoansQuery) -> ApiResult<Vec<LoanApplication>> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT * FROM loan_applications WHERE TRUE");

        if let Some(status) = query.status {
            builder.push(" AND status = ").push_bind(status);
        }
        if let Some(loan_type) = query.loan_type {
            builder.push(" AND loan_type = ").push_bind(loan_type);
        }
        if let Some(applicant_id) = query.applicant_id {
            builder.push(" AND applicant_id = ").push_bind(applicant_id);
        }
        builder.push(" ORDER BY date_submitted DESC");

        let apps = builder
            .build_query_as::<LoanApplication>()
            .fetch_all(&self.pool)
            .await?;

        Ok(apps)
    }

    /// Fetch one application visible to the actor.
    ///
    /// A record the actor may not read resolves to the same not-found as a
    /// record that does not exist.
    pub async fn get_for_actor(&self, actor: &Actor, id: i64) -> ApiResult<LoanApplication> {
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

    /// Applicant-side field update, allowed only while pending or rejected.
    ///
    /// The state gate runs before payload validation.
    pub async fn update_own(
        &self,
        actor: &Actor,
        id: i64,
        request: UpdateLoanApplicationRequest,
    ) -> ApiResult<LoanApplication> {
        let app = self.get_for_actor(actor, id).await?;

        if !authz::can(actor, Operation::UpdateFields, &app) {
            return Err(ApiError::ValidationError(format!(
                "You can only modify an application while it is pending or rejected (current status: '{}')",
                app.status.as_str()
            )));
        }

        request.validate()?;

        let updated = sqlx::query_as::<_, LoanApplication>(
            r#"
            UPDATE loan_applications SET
                amount_requested = COALESCE($2, amount_requested),
                loan_type = COALESCE($3, loan_type),
                repayment_period_months = COALESCE($4, repayment_period_months),
                purpose = COALESCE($5, purpose),
                property_address = COALESCE($6, property_address),
                date_updated = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(request.amount_requested)
        .bind(request.loan_type)
        .bind(request.repayment_period_months)
        .bind(request.purpose)
        .bind(request.property_address)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }

    /// Applicant-side cancellation, allowed only while pending or approved.
    ///
    /// Owner-scoped: anyone else, administrators included, resolves to
    /// not-found here; an administrator cancels through [`Self::admin_update`].
    /// Writes `cancelled` with a system-generated comment, appends a history
    /// entry, then notifies the applicant and every active administrator.
    pub async fn cancel(&self, actor: &Actor, id: i64) -> ApiResult<LoanApplication> {
        let mut tx = self.pool.begin().await?;

        let app = sqlx::query_as::<_, LoanApplication>(
            "SELECT * FROM loan_applications WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let app = match app {
            Some(app) if app.applicant_id == actor.id => app,
            _ => return Err(ApiError::NotFound("Loan application not found".to_string())),
        };

        if !authz::can(actor, Operation::Cancel, &app) {
            return Err(ApiError::ValidationError(format!(
                "Cannot cancel an application with status '{}'",
                app.status.as_str()
            )));
        }

        validate_transition(app.status, LoanStatus::Cancelled, None)?;

        let now = Utc::now();
        let comment = format!(
            "Annulé par le demandeur le {}",
            now.format("%Y-%m-%d %H:%M")
        );

        let cancelled = sqlx::query_as::<_, LoanApplication>(
            r#"
            UPDATE loan_applications SET
                status = 'cancelled',
                admin_comments = $2,
                date_decided = COALESCE(date_decided, $3),
                date_updated = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&comment)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        self.append_history(&mut tx, id, LoanStatus::Cancelled, Some(&comment), actor.id)
            .await?;

        tx.commit().await?;

        tracing::info!(dossier = %cancelled.dossier_number, "Loan application cancelled by applicant");

        // Post-commit, best-effort
        let admin_emails = self.active_admin_emails().await.unwrap_or_default();
        self.notifier
            .application_cancelled(&cancelled, &actor.email, &admin_emails)
            .await;

        Ok(cancelled)
    }

    /// Administrative update of any field, including guarded status changes.
    pub async fn admin_update(
        &self,
        actor: &Actor,
        id: i64,
        request: AdminUpdateLoanRequest,
    ) -> ApiResult<LoanApplication> {
        request.validate()?;

        let mut tx = self.pool.begin().await?;

        let app = sqlx::query_as::<_, LoanApplication>(
            "SELECT * FROM loan_applications WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ApiError::NotFound("Loan application not found".to_string()))?;

        let requested_status = request.status.unwrap_or(app.status);
        let status_changes = requested_status != app.status;

        if status_changes {
            validate_transition(app.status, requested_status, request.admin_comments.as_deref())?;
        }

        let now = Utc::now();

        // Decision stamping is write-once: the timestamp is set the first
        // time status leaves pending, the decider the first time a decision
        // state is entered. Neither is ever cleared by later transitions.
        let date_decided = match app.date_decided {
            Some(existing) => Some(existing),
            None if status_changes && requested_status != LoanStatus::Pending => Some(now),
            None => None,
        };
        let decided_by = match app.decided_by {
            Some(existing) => Some(existing),
            None if status_changes && requested_status.is_decision() => Some(actor.id),
            None => None,
        };

        // Entering approved without an explicit approved amount falls back to
        // the requested amount.
        let amount_approved: Option<Decimal> = request
            .amount_approved
            .or(app.amount_approved)
            .or_else(|| {
                (requested_status == LoanStatus::Approved).then_some(app.amount_requested)
            });

        let updated = sqlx::query_as::<_, LoanApplication>(
            r#"
            UPDATE loan_applications SET
                status = $2,
                admin_comments = COALESCE($3, admin_comments),
                amount_approved = $4,
                amount_requested = COALESCE($5, amount_requested),
                loan_type = COALESCE($6, loan_type),
                repayment_period_months = COALESCE($7, repayment_period_months),
                purpose = COALESCE($8, purpose),
                property_address = COALESCE($9, property_address),
                decided_by = $10,
                date_decided = $11,
                date_updated = $12
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(requested_status)
        .bind(&request.admin_comments)
        .bind(amount_approved)
        .bind(request.amount_requested)
        .bind(request.loan_type)
        .bind(request.repayment_period_months)
        .bind(&request.purpose)
        .bind(&request.property_address)
        .bind(decided_by)
        .bind(date_decided)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        if status_changes {
            self.append_history(
                &mut tx,
                id,
                requested_status,
                request.admin_comments.as_deref(),
                actor.id,
            )
            .await?;
        }

        tx.commit().await?;

        if status_changes {
            tracing::info!(
                dossier = %updated.dossier_number,
                from = app.status.as_str(),
                to = updated.status.as_str(),
                decided_by = actor.id,
                "Loan application status changed"
            );

            // Post-commit, best-effort
            if let Ok(email) = self.applicant_email(updated.applicant_id).await {
                self.notifier.status_changed(&updated, &email).await;
            }
        }

        Ok(updated)
    }

    /// Delete an application and notify the applicant (best-effort)
    pub async fn delete(&self, id: i64) -> ApiResult<()> {
        let app = sqlx::query_as::<_, LoanApplication>(
            "SELECT * FROM loan_applications WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("Loan application not found".to_string()))?;

        let applicant_email = self.applicant_email(app.applicant_id).await.ok();

        sqlx::query("DELETE FROM loan_applications WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        tracing::info!(dossier = %app.dossier_number, "Loan application deleted");

        if let Some(email) = applicant_email {
            self.notifier
                .application_deleted(&app.dossier_number, &email)
                .await;
        }

        Ok(())
    }

    /// Audit history of one application, oldest first
    pub async fn history(&self, actor: &Actor, id: i64) -> ApiResult<Vec<StatusHistoryEntry>> {
        // Resolves visibility the same way as a read
        let app = self.get_for_actor(actor, id).await?;

        let entries = sqlx::query_as::<_, StatusHistoryEntry>(
            "SELECT * FROM status_history WHERE application_id = $1 ORDER BY created_at ASC",
        )
        .bind(app.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    async fn append_history(
        &self,
        tx: &mut sqlx::Transaction<'_, Postgres>,
        application_id: i64,
        status: LoanStatus,
        comment: Option<&str>,
        changed_by: i64,
    ) -> ApiResult<()> {
        sqlx::query(
            r#"
            INSERT INTO status_history (application_id, status, comment, changed_by)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(application_id)
        .bind(status)
        .bind(comment)
        .bind(changed_by)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    async fn applicant_email(&self, user_id: i64) -> ApiResult<String> {
        let email = sqlx::query_scalar::<_, String>("SELECT email FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(email)
    }

    async fn active_admin_emails(&self) -> ApiResult<Vec<String>> {
        let emails = sqlx::query_scalar::<_, String>(
            "SELECT email FROM users WHERE role = 'administrateur' AND is_active = TRUE",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(emails)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dossier_number_format() {
        let number = generate_dossier_number();
        assert_eq!(number.len(), 8);
        assert!(number.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(number, number.to_uppercase());
    }

    #[test]
    fn test_dossier_numbers_vary() {
        let a = generate_dossier_number();
        let b = generate_dossier_number();
        // Collisions are possible but vanishingly unlikely
        assert_ne!(a, b);
    }
}
