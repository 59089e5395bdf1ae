//! Service Container - Centralized service access.

use std::sync::Arc;
use std::time::Duration;

use super::{
    AccountManager, AccountService, AuthService, Authenticator, PasswordResetManager,
    PasswordResetService, ResetTokens,
};
use crate::config::Config;
use crate::infra::{Mailer, UserRepository, UserStore};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    /// Get authentication service
    fn auth(&self) -> Arc<dyn AuthService>;

    /// Get account service
    fn accounts(&self) -> Arc<dyn AccountService>;

    /// Get password reset service
    fn password_reset(&self) -> Arc<dyn PasswordResetService>;
}

/// Concrete implementation of ServiceContainer
#[derive(Clone)]
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    account_service: Arc<dyn AccountService>,
    password_reset_service: Arc<dyn PasswordResetService>,
}

impl Services {
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        account_service: Arc<dyn AccountService>,
        password_reset_service: Arc<dyn PasswordResetService>,
    ) -> Self {
        Self {
            auth_service,
            account_service,
            password_reset_service,
        }
    }

    /// Wire every service over one repository and mailer.
    pub fn from_parts(
        users: Arc<dyn UserRepository>,
        mailer: Arc<dyn Mailer>,
        config: &Config,
    ) -> Self {
        let auth_service = Arc::new(Authenticator::new(users.clone(), config.clone()));
        let account_service = Arc::new(AccountManager::new(users.clone()));
        let password_reset_service = Arc::new(PasswordResetManager::new(
            users,
            mailer,
            ResetTokens::from_config(config),
            config.frontend_url.clone(),
            Duration::from_secs(config.email.timeout_seconds),
        ));

        Self::new(auth_service, account_service, password_reset_service)
    }

    /// Create service container from database connection and config
    pub fn from_connection(
        db: sea_orm::DatabaseConnection,
        mailer: Arc<dyn Mailer>,
        config: &Config,
    ) -> Self {
        Self::from_parts(Arc::new(UserStore::new(db)), mailer, config)
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn accounts(&self) -> Arc<dyn AccountService> {
        self.account_service.clone()
    }

    fn password_reset(&self) -> Arc<dyn PasswordResetService> {
        self.password_reset_service.clone()
    }
}
