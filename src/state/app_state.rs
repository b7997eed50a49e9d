//! Shared application state
//!
//! Built once at startup from the injected configuration and cloned into
//! every request; no other process-wide mutable state exists.

use sqlx::PgPool;
use std::sync::Arc;

use crate::attachments::AttachmentService;
use crate::config::Config;
use crate::loans::LoanService;
use crate::messaging::MessageService;
use crate::notify::Notifier;
use crate::users::UserService;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub loans: LoanService,
    pub messages: MessageService,
    pub attachments: AttachmentService,
    pub users: UserService,
}

impl AppState {
    pub fn new(pool: PgPool, config: Config) -> Self {
        let notifier = Notifier::from_config(&config);

        Self {
            loans: LoanService::new(pool.clone(), notifier),
            messages: MessageService::new(pool.clone()),
            attachments: AttachmentService::new(pool.clone()),
            users: UserService::new(pool.clone()),
            config: Arc::new(config),
            pool,
        }
    }
}
