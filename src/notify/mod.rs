//! Notification dispatcher
//!
//! Reacts to committed state changes by rendering a message and handing it to
//! the mail delivery collaborator. Delivery is best-effort and sits outside
//! the consistency boundary of the state machine: a failure is logged at
//! `warn` and never propagated to the caller, and dispatch always happens
//! after the surrounding transaction has committed.

pub mod templates;

use axum::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::config::Config;
use crate::loans::model::LoanApplication;

/// Delivery failure reported by a mailer
#[derive(Error, Debug)]
pub enum MailError {
    #[error("Mail relay request failed: {0}")]
    Relay(String),

    #[error("Mail relay returned status {0}")]
    RelayStatus(u16),
}

/// Boundary trait for the external delivery collaborator
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError>;
}

/// Mailer that posts rendered notifications to an HTTP mail relay
pub struct RelayMailer {
    client: reqwest::Client,
    endpoint: String,
    from: String,
}

impl RelayMailer {
    pub fn new(endpoint: String, from: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            from,
        }
    }
}

#[async_trait]
impl Mailer for RelayMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        let payload = serde_json::json!({
            "from": self.from,
            "to": to,
            "subject": subject,
            "body": body,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| MailError::Relay(e.to_string()))?;

        if !response.status().is_success() {
            return Err(MailError::RelayStatus(response.status().as_u16()));
        }

        Ok(())
    }
}

/// Fallback mailer used when no relay is configured; logs instead of sending
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, _body: &str) -> Result<(), MailError> {
        tracing::info!(to = %to, subject = %subject, "Mail relay not configured, notification logged only");
        Ok(())
    }
}

/// Dispatches notifications for committed loan application events
#[derive(Clone)]
pub struct Notifier {
    mailer: Arc<dyn Mailer>,
}

impl Notifier {
    pub fn new(mailer: Arc<dyn Mailer>) -> Self {
        Self { mailer }
    }

    /// Build a notifier from configuration: HTTP relay when configured,
    /// logging fallback otherwise.
    pub fn from_config(config: &Config) -> Self {
        match &config.mail_relay_url {
            Some(url) => Self::new(Arc::new(RelayMailer::new(
                url.clone(),
                config.mail_from.clone(),
            ))),
            None => Self::new(Arc::new(LogMailer)),
        }
    }

    async fn deliver(&self, to: &str, subject: &str, body: &str) {
        if let Err(e) = self.mailer.send(to, subject, body).await {
            tracing::warn!(to = %to, subject = %subject, error = %e, "Notification delivery failed");
        }
    }

    /// Notify the applicant that the status of their application changed
    pub async fn status_changed(&self, app: &LoanApplication, applicant_email: &str) {
        let (subject, body) = templates::status_update(app);
        self.deliver(applicant_email, &subject, &body).await;
    }

    /// Notify the applicant and every active administrator of a cancellation
    pub async fn application_cancelled(
        &self,
        app: &LoanApplication,
        applicant_email: &str,
        admin_emails: &[String],
    ) {
        let (subject, body) = templates::cancelled_applicant(app);
        self.deliver(applicant_email, &subject, &body).await;

        let (subject, body) = templates::cancelled_admin(app, applicant_email);
        for email in admin_emails {
            self.deliver(email, &subject, &body).await;
        }
    }

    /// Notify the applicant that their application was deleted
    pub async fn application_deleted(&self, dossier_number: &str, applicant_email: &str) {
        let (subject, body) = templates::application_deleted(dossier_number);
        self.deliver(applicant_email, &subject, &body).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FailingMailer {
        attempts: AtomicUsize,
    }

    #[async_trait]
    impl Mailer for FailingMailer {
        async fn send(&self, _to: &str, _subject: &str, _body: &str) -> Result<(), MailError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(MailError::RelayStatus(502))
        }
    }

    #[tokio::test]
    async fn test_delivery_failure_is_swallowed() {
        use chrono::Utc;
        use rust_decimal::Decimal;

        use crate::loans::model::{LoanStatus, LoanType};

        let mailer = Arc::new(FailingMailer {
            attempts: AtomicUsize::new(0),
        });
        let notifier = Notifier::new(mailer.clone());

        let app = LoanApplication {
            id: 1,
            dossier_number: "A1B2C3D4".to_string(),
            applicant_id: 1,
            amount_requested: Decimal::from(1000),
            loan_type: LoanType::Personal,
            repayment_period_months: 12,
            purpose: String::new(),
            property_address: None,
            status: LoanStatus::Approved,
            admin_comments: "ok".to_string(),
            amount_approved: Some(Decimal::from(1000)),
            decided_by: Some(2),
            date_submitted: Utc::now(),
            date_updated: Utc::now(),
            date_decided: Some(Utc::now()),
        };

        // Must not panic or return an error
        notifier.status_changed(&app, "agent@example.gov").await;
        assert_eq!(mailer.attempts.load(Ordering::SeqCst), 1);
    }
}
