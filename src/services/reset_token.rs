//! Password-reset token issuer and verifier.
//!
//! A reset link carries two values: `uid`, the URL-safe base64 of the user
//! id, and `token`, a JWT signed with the application secret concatenated
//! with the user's current password hash. Changing the password changes the
//! signing key, so a token stops verifying the moment it has been used.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{Config, RESET_TOKEN_PURPOSE};
use crate::domain::User;
use crate::errors::AppError;
use crate::infra::UserRepository;

/// Why a presented reset link was refused.
#[derive(Debug, thiserror::Error)]
pub enum ResetTokenError {
    #[error("Invalid user id or user doesn't exist.")]
    UnknownIdentity,

    #[error("Invalid token for given user.")]
    InvalidOrExpired,

    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<ResetTokenError> for AppError {
    fn from(err: ResetTokenError) -> Self {
        let message = err.to_string();
        match err {
            ResetTokenError::UnknownIdentity => AppError::validation("uid", message),
            ResetTokenError::InvalidOrExpired => AppError::validation("token", message),
            ResetTokenError::Store(e) => e,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ResetClaims {
    sub: Uuid,
    iat: i64,
    exp: i64,
    purpose: String,
}

/// Issues and checks reset tokens.
#[derive(Clone)]
pub struct ResetTokens {
    secret: Vec<u8>,
    ttl_seconds: i64,
}

impl ResetTokens {
    pub fn new(secret: &[u8], ttl_seconds: i64) -> Self {
        Self {
            secret: secret.to_vec(),
            ttl_seconds,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.jwt_secret_bytes(), config.password_reset_timeout_seconds)
    }

    /// Token lifetime in seconds.
    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    /// Encode a user id as a URL-safe identity reference.
    pub fn encode_uid(id: Uuid) -> String {
        URL_SAFE_NO_PAD.encode(id.as_bytes())
    }

    /// Decode an identity reference; `None` if it is not a valid encoding.
    pub fn decode_uid(uid: &str) -> Option<Uuid> {
        let bytes = URL_SAFE_NO_PAD.decode(uid.trim()).ok()?;
        Uuid::from_slice(&bytes).ok()
    }

    /// Issue `(uid, token)` for `user`, valid from now.
    pub fn issue(&self, user: &User) -> Result<(String, String), AppError> {
        self.issue_at(user, Utc::now().timestamp())
    }

    /// Issue `(uid, token)` as if the current time were `now` (unix seconds).
    pub fn issue_at(&self, user: &User, now: i64) -> Result<(String, String), AppError> {
        let claims = ResetClaims {
            sub: user.id,
            iat: now,
            exp: now.saturating_add(self.ttl_seconds),
            purpose: RESET_TOKEN_PURPOSE.to_string(),
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&self.signing_key(user)),
        )
        .map_err(|e| AppError::internal(format!("Failed to sign reset token: {e}")))?;

        Ok((Self::encode_uid(user.id), token))
    }

    /// Resolve `uid` to a user and check `token` against their current state.
    pub async fn verify(
        &self,
        uid: &str,
        token: &str,
        users: &dyn UserRepository,
    ) -> Result<User, ResetTokenError> {
        self.verify_at(uid, token, users, Utc::now().timestamp()).await
    }

    /// [`verify`](Self::verify) with an explicit current time.
    pub async fn verify_at(
        &self,
        uid: &str,
        token: &str,
        users: &dyn UserRepository,
        now: i64,
    ) -> Result<User, ResetTokenError> {
        let id = Self::decode_uid(uid).ok_or(ResetTokenError::UnknownIdentity)?;
        let user = users
            .find_by_id(id)
            .await?
            .ok_or(ResetTokenError::UnknownIdentity)?;

        if self.check_token_at(&user, token, now) {
            Ok(user)
        } else {
            Err(ResetTokenError::InvalidOrExpired)
        }
    }

    /// Whether `token` is valid for `user` at time `now`.
    pub fn check_token_at(&self, user: &User, token: &str, now: i64) -> bool {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked below against the supplied clock.
        validation.validate_exp = false;

        let claims = match decode::<ResetClaims>(
            token,
            &DecodingKey::from_secret(&self.signing_key(user)),
            &validation,
        ) {
            Ok(data) => data.claims,
            Err(_) => return false,
        };

        claims.sub == user.id
            && claims.purpose == RESET_TOKEN_PURPOSE
            && claims.iat <= now
            && now <= claims.exp
    }

    fn signing_key(&self, user: &User) -> Vec<u8> {
        let mut key = self.secret.clone();
        key.extend_from_slice(user.password_hash.as_bytes());
        key
    }
}
