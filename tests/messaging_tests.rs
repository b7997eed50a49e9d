//! Service-level tests for application discussion threads

use rust_decimal::Decimal;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use pret_backend::authz::Actor;
use pret_backend::db;
use pret_backend::loans::model::{CreateLoanApplicationRequest, LoanType};
use pret_backend::loans::LoanService;
use pret_backend::messaging::{CreateMessageRequest, MessageService};
use pret_backend::notify::{LogMailer, Notifier};
use pret_backend::users::model::{User, UserRole};

async fn setup_test_db() -> PgPool {
    let database_url = std::env::var("TEST_DATABASE_URL")
        .unwrap_or_else(|_| "postgresql://localhost/pret_test".to_string());

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await
        .expect("Failed to connect to test database");

    db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

async fn create_user(pool: &PgPool, role: UserRole) -> Actor {
    let email = format!("user-{}@example.gov", Uuid::new_v4().simple());

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (email, role, cin_number, is_active, is_verified)
        VALUES ($1, $2, $3, TRUE, TRUE)
        RETURNING *
        "#,
    )
    .bind(&email)
    .bind(role)
    .bind(format!("CIN-{}", Uuid::new_v4().simple()))
    .fetch_one(pool)
    .await
    .expect("Failed to insert test user");

    Actor::from_user(&user)
}

async fn create_application(pool: &PgPool, applicant: &Actor) -> i64 {
    let loans = LoanService::new(pool.clone(), Notifier::new(Arc::new(LogMailer)));
    loans
        .create(
            applicant,
            CreateLoanApplicationRequest {
                amount_requested: Decimal::from(1_000),
                loan_type: Some(LoanType::Personal),
                repayment_period_months: 12,
                purpose: None,
                property_address: None,
            },
        )
        .await
        .expect("Failed to create application")
        .id
}

fn message(body: &str) -> CreateMessageRequest {
    CreateMessageRequest {
        body: body.to_string(),
    }
}

#[tokio::test]
#[ignore] // Requires database setup
async fn test_owner_and_admin_share_the_thread() {
    let pool = setup_test_db().await;
    let messages = MessageService::new(pool.clone());

    let owner = create_user(&pool, UserRole::Fonctionnaire).await;
    let admin = create_user(&pool, UserRole::Administrateur).await;
    let app_id = create_application(&pool, &owner).await;

    messages
        .post(&owner, app_id, message("Des nouvelles de mon dossier ?"))
        .await
        .unwrap();
    messages
        .post(&admin, app_id, message("En cours d'examen."))
        .await
        .unwrap();

    let owner_view = messages.list_for_application(&owner, app_id).await.unwrap();
    let admin_view = messages.list_for_application(&admin, app_id).await.unwrap();

    assert_eq!(owner_view.len(), 2);
    assert_eq!(admin_view.len(), 2);
    assert_eq!(owner_view[0].author_email, owner.email);
}

#[tokio::test]
#[ignore] // Requires database setup
async fn test_stranger_cannot_post_or_read() {
    let pool = setup_test_db().await;
    let messages = MessageService::new(pool.clone());

    let owner = create_user(&pool, UserRole::Fonctionnaire).await;
    let stranger = create_user(&pool, UserRole::Fonctionnaire).await;
    let app_id = create_application(&pool, &owner).await;

    // Posting on a foreign application is a permission error
    let result = messages.post(&stranger, app_id, message("bonjour")).await;
    assert!(result.is_err());

    // Reading a foreign thread resolves to not-found
    let result = messages.list_for_application(&stranger, app_id).await;
    assert!(result.is_err());
}

#[tokio::test]
#[ignore] // Requires database setup
async fn test_cross_application_listing() {
    let pool = setup_test_db().await;
    let messages = MessageService::new(pool.clone());

    let owner = create_user(&pool, UserRole::Fonctionnaire).await;
    let admin = create_user(&pool, UserRole::Administrateur).await;
    let app_id = create_application(&pool, &owner).await;

    messages.post(&owner, app_id, message("premier")).await.unwrap();
    messages.post(&admin, app_id, message("réponse")).await.unwrap();

    // The fonctionnaire only sees messages they authored
    let own = messages.list_mine(&owner).await.unwrap();
    assert!(own.iter().all(|m| m.author_id == owner.id));
    assert!(own.iter().any(|m| m.application_id == app_id));

    // The administrator sees the whole platform
    let all = messages.list_mine(&admin).await.unwrap();
    assert!(all.iter().any(|m| m.author_id == owner.id));
    assert!(all.iter().any(|m| m.author_id == admin.id));
}
