//! Password value object - Domain layer password handling.
//!
//! Argon2 hashing and verification, plus the strength policy applied when a
//! password is chosen through the reset flow.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::config::MIN_PASSWORD_LENGTH;
use crate::errors::{AppError, AppResult};

/// Passwords rejected outright by the strength policy.
const COMMON_PASSWORDS: &[&str] = &[
    "password",
    "password1",
    "password12",
    "password123",
    "passw0rd",
    "12345678",
    "123456789",
    "1234567890",
    "87654321",
    "11111111",
    "00000000",
    "qwertyuiop",
    "qwerty123",
    "azertyuiop",
    "iloveyou",
    "sunshine",
    "football",
    "baseball",
    "letmein1",
    "welcome1",
    "abc12345",
    "abcd1234",
    "trustno1",
    "superman",
    "motdepasse",
];

/// Attribute fragments shorter than this are ignored by the similarity rule.
const MIN_SIMILAR_FRAGMENT: usize = 4;

/// Password value object that handles hashing and verification.
#[derive(Clone)]
pub struct Password {
    hash: String,
}

// Don't expose hash in debug output (security)
impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Password")
            .field("hash", &"[REDACTED]")
            .finish()
    }
}

impl Password {
    /// Create a new password by hashing the plain text.
    ///
    /// # Errors
    /// Returns a validation error on `password` if it is too short.
    pub fn new(plain_text: &str) -> AppResult<Self> {
        if plain_text.chars().count() < MIN_PASSWORD_LENGTH as usize {
            return Err(AppError::validation(
                "password",
                format!(
                    "Ensure this field has at least {} characters.",
                    MIN_PASSWORD_LENGTH
                ),
            ));
        }

        let hash = Self::hash(plain_text)?;
        Ok(Self { hash })
    }

    /// Create a Password from an existing hash (from database).
    pub fn from_hash(hash: String) -> Self {
        Self { hash }
    }

    /// Get the hash string for storage.
    pub fn as_str(&self) -> &str {
        &self.hash
    }

    /// Consume and return the hash string.
    pub fn into_string(self) -> String {
        self.hash
    }

    /// Verify a plain text password against this hash.
    pub fn verify(&self, plain_text: &str) -> bool {
        Self::verify_hash(plain_text, &self.hash).unwrap_or(false)
    }

    /// Problems that make `plain_text` unacceptable as a new password.
    ///
    /// `user_attributes` are values such as the email and name that the
    /// password must not resemble. An empty result means the password passes.
    pub fn strength_problems(plain_text: &str, user_attributes: &[&str]) -> Vec<String> {
        let mut problems = Vec::new();
        let lowered = plain_text.to_lowercase();

        if plain_text.chars().count() < MIN_PASSWORD_LENGTH as usize {
            problems.push(format!(
                "This password is too short. It must contain at least {} characters.",
                MIN_PASSWORD_LENGTH
            ));
        }

        if !plain_text.is_empty() && plain_text.chars().all(|c| c.is_ascii_digit()) {
            problems.push("This password is entirely numeric.".to_string());
        }

        if COMMON_PASSWORDS.contains(&lowered.as_str()) {
            problems.push("This password is too common.".to_string());
        }

        if is_similar_to_any(&lowered, user_attributes) {
            problems.push("The password is too similar to your personal information.".to_string());
        }

        problems
    }

    /// Hash a password using Argon2.
    fn hash(plain_text: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Self::argon2()
            .hash_password(plain_text.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hash failed: {}", e)))?;
        Ok(hash.to_string())
    }

    /// Verify password against hash.
    fn verify_hash(plain_text: &str, hash: &str) -> AppResult<bool> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| AppError::internal(format!("Invalid hash format: {}", e)))?;
        Ok(Self::argon2()
            .verify_password(plain_text.as_bytes(), &parsed)
            .is_ok())
    }

    #[inline]
    fn argon2() -> Argon2<'static> {
        Argon2::default()
    }
}

/// Whether the lowercased password contains, or is contained in, any
/// meaningful fragment of the user attributes.
fn is_similar_to_any(lowered: &str, user_attributes: &[&str]) -> bool {
    if lowered.len() < MIN_SIMILAR_FRAGMENT {
        return false;
    }

    user_attributes
        .iter()
        .flat_map(|attr| {
            attr.to_lowercase()
                .split(|c: char| !c.is_alphanumeric())
                .filter(|part| part.len() >= MIN_SIMILAR_FRAGMENT)
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .any(|fragment| lowered.contains(&fragment) || fragment.contains(lowered))
}

impl From<Password> for String {
    fn from(password: Password) -> Self {
        password.hash
    }
}

impl PartialEq for Password {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl Eq for Password {}
