//! Password reset service - Request and confirm steps of the email flow.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use super::reset_token::ResetTokens;
use crate::domain::{normalize_email, Password};
use crate::errors::{AppError, AppResult, FieldErrors};
use crate::infra::{Mailer, UserRepository};
use crate::utils::templates::password_reset_email;

/// Confirm-step input as submitted from the reset link form.
#[derive(Debug, Clone)]
pub struct ResetConfirmation {
    pub uid: String,
    pub token: String,
    pub new_password: String,
    pub re_new_password: String,
}

/// Password reset service trait for dependency injection.
#[async_trait]
pub trait PasswordResetService: Send + Sync {
    /// Email a reset link if `email` belongs to an active account.
    ///
    /// Succeeds identically whether or not the account exists. Fails only
    /// when an account was found and the email could not be sent.
    async fn request_reset(&self, email: String) -> AppResult<()>;

    /// Verify the link and set the new password.
    async fn confirm_reset(&self, confirmation: ResetConfirmation) -> AppResult<()>;
}

/// Concrete implementation of PasswordResetService.
pub struct PasswordResetManager {
    users: Arc<dyn UserRepository>,
    mailer: Arc<dyn Mailer>,
    tokens: ResetTokens,
    frontend_url: String,
    send_timeout: Duration,
}

impl PasswordResetManager {
    pub fn new(
        users: Arc<dyn UserRepository>,
        mailer: Arc<dyn Mailer>,
        tokens: ResetTokens,
        frontend_url: impl Into<String>,
        send_timeout: Duration,
    ) -> Self {
        Self {
            users,
            mailer,
            tokens,
            frontend_url: frontend_url.into(),
            send_timeout,
        }
    }
}

#[async_trait]
impl PasswordResetService for PasswordResetManager {
    async fn request_reset(&self, email: String) -> AppResult<()> {
        let email = normalize_email(&email);

        let user = match self.users.find_by_email(&email).await? {
            Some(user) if user.is_active => user,
            _ => {
                tracing::debug!("Password reset requested for unknown or inactive account");
                return Ok(());
            }
        };

        let (uid, token) = self.tokens.issue(&user)?;
        let message = password_reset_email(
            &user,
            &uid,
            &token,
            &self.frontend_url,
            self.tokens.ttl_seconds(),
        );

        match tokio::time::timeout(self.send_timeout, self.mailer.send(message)).await {
            Ok(Ok(())) => {
                tracing::info!(user_id = %user.id, "Password reset email sent");
                Ok(())
            }
            Ok(Err(e)) => {
                tracing::error!(user_id = %user.id, error = %e, "Password reset email failed");
                Err(e)
            }
            Err(_) => {
                tracing::error!(
                    user_id = %user.id,
                    timeout_secs = self.send_timeout.as_secs(),
                    "Password reset email timed out"
                );
                Err(AppError::EmailDispatch("send timed out".to_string()))
            }
        }
    }

    async fn confirm_reset(&self, confirmation: ResetConfirmation) -> AppResult<()> {
        let ResetConfirmation {
            uid,
            token,
            new_password,
            re_new_password,
        } = confirmation;

        if new_password != re_new_password {
            return Err(AppError::validation(
                "re_new_password",
                "The two password fields didn't match.",
            ));
        }

        let user = self.tokens.verify(&uid, &token, self.users.as_ref()).await?;

        let mut errors = FieldErrors::new();
        for problem in Password::strength_problems(&new_password, &[&user.email, &user.name]) {
            errors.add("new_password", problem);
        }
        errors.into_result()?;

        let password_hash = Password::new(&new_password)?.into_string();
        self.users.set_password(user.id, password_hash).await?;

        tracing::info!(user_id = %user.id, "Password reset completed");
        Ok(())
    }
}
