//! Notification templates
//!
//! Plain-text French messages sent to applicants and administrators. Each
//! function returns `(subject, body)`.

use crate::loans::model::LoanApplication;

/// Status-change notice to the applicant
pub fn status_update(app: &LoanApplication) -> (String, String) {
    let subject = format!(
        "Mise à jour de votre demande de prêt #{} - Statut : {}",
        app.dossier_number,
        app.status.label_fr()
    );

    let mut body = format!(
        "Bonjour,\n\n\
         Le statut de votre demande de prêt n°{} ({}) est désormais : {}.\n",
        app.dossier_number,
        app.loan_type.label_fr(),
        app.status.label_fr()
    );

    if let Some(amount) = app.amount_approved {
        body.push_str(&format!("Montant approuvé : {}\n", amount));
    }

    if !app.admin_comments.trim().is_empty() {
        body.push_str(&format!(
            "Commentaire de l'administrateur : {}\n",
            app.admin_comments
        ));
    }

    body.push_str("\nCordialement,\nL'équipe de la plateforme de prêt\n");

    (subject, body)
}

/// Cancellation notice to the applicant
pub fn cancelled_applicant(app: &LoanApplication) -> (String, String) {
    let subject = format!(
        "Votre demande de prêt a été annulée : {}",
        app.dossier_number
    );
    let body = format!(
        "Bonjour,\n\n\
         Votre demande de prêt n°{} a bien été annulée.\n\n\
         Cordialement,\nL'équipe de la plateforme de prêt\n",
        app.dossier_number
    );
    (subject, body)
}

/// Cancellation notice to the administrators
pub fn cancelled_admin(app: &LoanApplication, applicant_email: &str) -> (String, String) {
    let subject = format!("Demande de prêt annulée : {}", app.dossier_number);
    let body = format!(
        "La demande de prêt n°{} soumise par {} a été annulée par le demandeur.\n\n\
         Commentaire : {}\n",
        app.dossier_number, applicant_email, app.admin_comments
    );
    (subject, body)
}

/// Deletion notice to the applicant
pub fn application_deleted(dossier_number: &str) -> (String, String) {
    let subject = format!(
        "Votre demande de prêt #{} a été supprimée",
        dossier_number
    );
    let body = format!(
        "Bonjour,\n\n\
         Nous vous informons que votre demande de prêt numéro {} a été supprimée \
         par l'administrateur.\n\n\
         Cordialement,\nL'équipe de la plateforme de prêt\n",
        dossier_number
    );
    (subject, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;

    use crate::loans::model::{LoanStatus, LoanType};

    fn app(status: LoanStatus, amount_approved: Option<Decimal>, comments: &str) -> LoanApplication {
        LoanApplication {
            id: 7,
            dossier_number: "B4C2D8E1".to_string(),
            applicant_id: 1,
            amount_requested: Decimal::from(500_000),
            loan_type: LoanType::Housing,
            repayment_period_months: 120,
            purpose: "Achat appartement".to_string(),
            property_address: Some("12 rue des Lilas".to_string()),
            status,
            admin_comments: comments.to_string(),
            amount_approved,
            decided_by: None,
            date_submitted: Utc::now(),
            date_updated: Utc::now(),
            date_decided: None,
        }
    }

    #[test]
    fn test_status_update_mentions_dossier_and_status() {
        let (subject, body) = status_update(&app(
            LoanStatus::Approved,
            Some(Decimal::from(450_000)),
            "ok sous conditions",
        ));

        assert!(subject.contains("B4C2D8E1"));
        assert!(subject.contains("Approuvé"));
        assert!(body.contains("450000"));
        assert!(body.contains("ok sous conditions"));
    }

    #[test]
    fn test_status_update_omits_empty_sections() {
        let (_, body) = status_update(&app(LoanStatus::Disbursed, None, ""));

        assert!(!body.contains("Montant approuvé"));
        assert!(!body.contains("Commentaire"));
    }

    #[test]
    fn test_cancellation_notices() {
        let app = app(LoanStatus::Cancelled, None, "Annulé par le demandeur");

        let (subject, _) = cancelled_applicant(&app);
        assert!(subject.contains("B4C2D8E1"));

        let (subject, body) = cancelled_admin(&app, "agent@example.gov");
        assert!(subject.contains("B4C2D8E1"));
        assert!(body.contains("agent@example.gov"));
        assert!(body.contains("Annulé par le demandeur"));
    }

    #[test]
    fn test_deletion_notice() {
        let (subject, body) = application_deleted("B4C2D8E1");
        assert!(subject.contains("B4C2D8E1"));
        assert!(body.contains("supprimée"));
    }
}
