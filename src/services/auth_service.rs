//! Authentication service - Handles credential checks and bearer tokens.
//!
//! Password hashing lives in the domain `Password` value object; this
//! service only decides who gets a token.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{Config, SECONDS_PER_HOUR, TOKEN_TYPE_BEARER};
use crate::domain::{normalize_email, Password, User};
use crate::errors::{AppError, AppResult};
use crate::infra::UserRepository;

/// JWT claims payload
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub is_staff: bool,
    pub exp: i64,
    pub iat: i64,
}

/// Token response returned after successful authentication
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    /// Bearer token to send as `Authorization: Bearer <token>`
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub token: String,
    /// Token type (always "Bearer")
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Token lifetime in seconds
    #[schema(example = 86400)]
    pub expires_in: i64,
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Exchange email and password for a bearer token
    async fn login(&self, email: String, password: String) -> AppResult<TokenResponse>;

    /// Verify JWT token and extract claims
    fn verify_token(&self, token: &str) -> AppResult<Claims>;
}

// Never matches a real password; keeps the unknown-email path doing the same work.
const DUMMY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$3qTqzDNgsxKJwJSvYv8B0xMgVrGd2NVKXpYHnTnDqXQ";

fn generate_token(user: &User, config: &Config) -> AppResult<TokenResponse> {
    let now = Utc::now();
    let expires_at = Duration::try_hours(config.jwt_expiration_hours)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .ok_or_else(|| AppError::internal("JWT expiration is out of range"))?;

    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        is_staff: user.is_staff,
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret_bytes()),
    )?;

    Ok(TokenResponse {
        token,
        token_type: TOKEN_TYPE_BEARER.to_string(),
        expires_in: config.jwt_expiration_hours * SECONDS_PER_HOUR,
    })
}

/// Concrete implementation of AuthService backed by a user repository.
pub struct Authenticator {
    users: Arc<dyn UserRepository>,
    config: Config,
}

impl Authenticator {
    pub fn new(users: Arc<dyn UserRepository>, config: Config) -> Self {
        Self { users, config }
    }
}

#[async_trait]
impl AuthService for Authenticator {
    async fn login(&self, email: String, password: String) -> AppResult<TokenResponse> {
        let email = normalize_email(&email);
        let user = self.users.find_by_email(&email).await?;

        // Verify even when the user is missing so both paths cost the same.
        let hash = user
            .as_ref()
            .map_or(DUMMY_HASH, |u| u.password_hash.as_str());
        let password_valid = Password::from_hash(hash.to_string()).verify(&password);

        let user = match user {
            Some(user) if password_valid && user.is_active => user,
            Some(user) if password_valid => {
                tracing::info!(user_id = %user.id, "Login refused for inactive account");
                return Err(AppError::InvalidCredentials);
            }
            _ => return Err(AppError::InvalidCredentials),
        };

        self.users.touch_last_login(user.id).await?;
        tracing::info!(user_id = %user.id, "User logged in");

        generate_token(&user, &self.config)
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::MockUserRepository;
    use mockall::predicate::eq;

    const SECRET: &str = "test-secret-key-for-testing-only-32chars";

    fn user_with_password(password: &str, is_active: bool) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            email: "a@x.com".to_string(),
            password_hash: Password::new(password).unwrap().into_string(),
            name: "A".to_string(),
            gender: None,
            birth_date: None,
            is_active,
            is_staff: false,
            is_superuser: false,
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn authenticator(repo: MockUserRepository) -> Authenticator {
        Authenticator::new(Arc::new(repo), Config::with_secret(SECRET))
    }

    #[tokio::test]
    async fn test_login_success_issues_verifiable_token() {
        let user = user_with_password("Testpass123", true);
        let user_id = user.id;

        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email()
            .with(eq("a@x.com"))
            .returning(move |_| Ok(Some(user.clone())));
        repo.expect_touch_last_login()
            .with(eq(user_id))
            .times(1)
            .returning(|_| Ok(()));

        let auth = authenticator(repo);
        let response = auth
            .login("a@X.com".to_string(), "Testpass123".to_string())
            .await
            .unwrap();

        assert_eq!(response.token_type, "Bearer");
        assert_eq!(response.expires_in, 24 * 3600);

        let claims = auth.verify_token(&response.token).unwrap();
        assert_eq!(claims.sub, user_id);
        assert!(!claims.is_staff);
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let user = user_with_password("Testpass123", true);
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email()
            .returning(move |_| Ok(Some(user.clone())));
        repo.expect_touch_last_login().never();

        let result = authenticator(repo)
            .login("a@x.com".to_string(), "wrongpass".to_string())
            .await;
        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_unknown_email_gives_same_error() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email().returning(|_| Ok(None));

        let result = authenticator(repo)
            .login("nobody@x.com".to_string(), "Testpass123".to_string())
            .await;
        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_inactive_account_refused() {
        let user = user_with_password("Testpass123", false);
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email()
            .returning(move |_| Ok(Some(user.clone())));
        repo.expect_touch_last_login().never();

        let result = authenticator(repo)
            .login("a@x.com".to_string(), "Testpass123".to_string())
            .await;
        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }

    #[test]
    fn test_verify_token_rejects_garbage() {
        let auth = authenticator(MockUserRepository::new());
        assert!(matches!(
            auth.verify_token("not-a-token"),
            Err(AppError::Jwt(_))
        ));
    }

    #[test]
    fn test_out_of_range_expiration_is_an_error() {
        let mut config = Config::with_secret(SECRET);
        config.jwt_expiration_hours = i64::MAX;
        let user = user_with_password("Testpass123", true);

        assert!(matches!(
            generate_token(&user, &config),
            Err(AppError::Internal(_))
        ));
    }
}
