//! Application state - Dependency injection container.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::{Database, Mailer};
use crate::services::{AccountService, AuthService, PasswordResetService, ServiceContainer, Services};

/// Application state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    /// Authentication service
    pub auth_service: Arc<dyn AuthService>,
    /// Account service
    pub account_service: Arc<dyn AccountService>,
    /// Password reset service
    pub password_reset_service: Arc<dyn PasswordResetService>,
    /// Database connection
    pub database: Arc<Database>,
}

impl AppState {
    /// Build the state over a live database connection.
    pub fn from_config(database: Arc<Database>, mailer: Arc<dyn Mailer>, config: &Config) -> Self {
        let services = Services::from_connection(database.get_connection(), mailer, config);
        Self::new(&services, database)
    }

    /// Build the state from an already wired container.
    pub fn new(services: &impl ServiceContainer, database: Arc<Database>) -> Self {
        Self {
            auth_service: services.auth(),
            account_service: services.accounts(),
            password_reset_service: services.password_reset(),
            database,
        }
    }
}
