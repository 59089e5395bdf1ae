//! Account service - Registration, profile and administrative use cases.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::identity::{self, check_personal_fields, parse_gender};
use crate::domain::{normalize_email, NewUser, Password, User};
use crate::errors::{AppError, AppResult, FieldErrors, OptionExt};
use crate::infra::UserRepository;

const BLANK_FIELD: &str = "This field may not be blank.";

/// Self-service registration input.
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub name: String,
    pub gender: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

/// Partial profile update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub password: Option<String>,
}

/// Account service trait for dependency injection.
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Register a regular account
    async fn register(&self, registration: Registration) -> AppResult<User>;

    /// Create an administrative account (no gender or birth date required)
    async fn create_superuser(
        &self,
        email: String,
        password: String,
        name: Option<String>,
    ) -> AppResult<User>;

    /// Load the caller's own account
    async fn profile(&self, id: Uuid) -> AppResult<User>;

    /// Apply a partial update to the caller's own account
    async fn update_profile(&self, id: Uuid, changes: ProfileChanges) -> AppResult<User>;

    /// Every account that is not a superuser
    async fn list_users(&self) -> AppResult<Vec<User>>;
}

/// Concrete implementation of AccountService.
pub struct AccountManager {
    users: Arc<dyn UserRepository>,
}

impl AccountManager {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }
}

fn check_blank(errors: &mut FieldErrors, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.add(field, BLANK_FIELD);
    }
}

#[async_trait]
impl AccountService for AccountManager {
    async fn register(&self, registration: Registration) -> AppResult<User> {
        let Registration {
            email,
            password,
            name,
            gender,
            birth_date,
        } = registration;

        let mut errors = check_personal_fields(gender.as_deref(), birth_date, identity::today());
        check_blank(&mut errors, "email", &email);
        check_blank(&mut errors, "name", &name);

        // Hashing is skipped once anything else has failed; nothing is written.
        let password = match Password::new(&password) {
            Ok(p) => Some(p),
            Err(AppError::Validation(fields)) => {
                errors.merge(fields);
                None
            }
            Err(e) => return Err(e),
        };
        errors.into_result()?;

        let (Some(password), Some(birth_date)) = (password, birth_date) else {
            return Err(AppError::internal("incomplete registration after validation"));
        };
        let gender = parse_gender(gender.as_deref())
            .map_err(|e| AppError::validation(e.field(), e.to_string()))?;

        let new_user = NewUser::regular(
            normalize_email(&email),
            password.into_string(),
            name.trim().to_string(),
            gender,
            birth_date,
        );

        let user = self.users.create(new_user).await?;
        tracing::info!(user_id = %user.id, email = %user.email, "User registered");
        Ok(user)
    }

    async fn create_superuser(
        &self,
        email: String,
        password: String,
        name: Option<String>,
    ) -> AppResult<User> {
        let email = normalize_email(&email);
        if email.is_empty() {
            return Err(AppError::validation("email", BLANK_FIELD));
        }

        let name = name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());

        let password_hash = Password::new(&password)?.into_string();
        let user = self
            .users
            .create(NewUser::superuser(email, password_hash, name))
            .await?;

        tracing::info!(user_id = %user.id, email = %user.email, "Superuser created");
        Ok(user)
    }

    async fn profile(&self, id: Uuid) -> AppResult<User> {
        self.users.find_by_id(id).await?.ok_or_not_found()
    }

    async fn update_profile(&self, id: Uuid, changes: ProfileChanges) -> AppResult<User> {
        let mut errors = FieldErrors::new();

        let name = changes.name.map(|n| n.trim().to_string());
        if let Some(name) = &name {
            check_blank(&mut errors, "name", name);
        }

        let password_hash = match changes.password.as_deref().map(Password::new) {
            None => None,
            Some(Ok(p)) => Some(p.into_string()),
            Some(Err(AppError::Validation(fields))) => {
                errors.merge(fields);
                None
            }
            Some(Err(e)) => return Err(e),
        };
        errors.into_result()?;

        let updated = password_hash.is_some();
        let user = self.users.update_profile(id, name, password_hash).await?;
        tracing::info!(user_id = %user.id, password_changed = updated, "Profile updated");
        Ok(user)
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        self.users.list_non_superusers().await
    }
}
