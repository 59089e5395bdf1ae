//! Application settings loaded from environment variables.

use std::env;
use std::str::FromStr;

use super::constants::{
    DEFAULT_DATABASE_URL, DEFAULT_EMAIL_TIMEOUT_SECONDS, DEFAULT_FROM_EMAIL,
    DEFAULT_FRONTEND_URL, DEFAULT_JWT_EXPIRATION_HOURS, DEFAULT_PASSWORD_RESET_TIMEOUT_SECONDS,
    DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT, DEFAULT_SMTP_PORT, MAX_JWT_EXPIRATION_HOURS,
    MAX_PASSWORD_RESET_TIMEOUT_SECONDS, MIN_JWT_SECRET_LENGTH,
};

/// Outbound mail settings
#[derive(Clone)]
pub struct EmailSettings {
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_user: Option<String>,
    smtp_pass: Option<String>,
    pub smtp_tls: bool,
    pub from_email: String,
    pub timeout_seconds: u64,
}

impl EmailSettings {
    /// SMTP is used only when a host is configured; otherwise mail is logged.
    pub fn is_configured(&self) -> bool {
        self.smtp_host.is_some()
    }

    /// SMTP password, if any.
    pub fn smtp_password(&self) -> Option<&str> {
        self.smtp_pass.as_deref()
    }

    fn from_env() -> Self {
        Self {
            smtp_host: env::var("SMTP_HOST").ok().filter(|h| !h.is_empty()),
            smtp_port: parse_env("SMTP_PORT").unwrap_or(DEFAULT_SMTP_PORT),
            smtp_user: env::var("SMTP_USER").ok(),
            smtp_pass: env::var("SMTP_PASS").ok(),
            smtp_tls: env::var("SMTP_TLS")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(true),
            from_email: env::var("DEFAULT_FROM_EMAIL")
                .unwrap_or_else(|_| DEFAULT_FROM_EMAIL.to_string()),
            timeout_seconds: parse_env("EMAIL_TIMEOUT_SECONDS")
                .unwrap_or(DEFAULT_EMAIL_TIMEOUT_SECONDS),
        }
    }
}

impl Default for EmailSettings {
    fn default() -> Self {
        Self {
            smtp_host: None,
            smtp_port: DEFAULT_SMTP_PORT,
            smtp_user: None,
            smtp_pass: None,
            smtp_tls: true,
            from_email: DEFAULT_FROM_EMAIL.to_string(),
            timeout_seconds: DEFAULT_EMAIL_TIMEOUT_SECONDS,
        }
    }
}

impl std::fmt::Debug for EmailSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailSettings")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_user", &self.smtp_user)
            .field("smtp_pass", &"[REDACTED]")
            .field("smtp_tls", &self.smtp_tls)
            .field("from_email", &self.from_email)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub password_reset_timeout_seconds: i64,
    pub frontend_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub email: EmailSettings,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_expiration_hours", &self.jwt_expiration_hours)
            .field(
                "password_reset_timeout_seconds",
                &self.password_reset_timeout_seconds,
            )
            .field("frontend_url", &self.frontend_url)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("email", &self.email)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Panics
    /// Panics if JWT_SECRET is not set or is too short (security requirement).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            if cfg!(debug_assertions) {
                tracing::warn!("JWT_SECRET not set, using insecure default for development");
                "dev-secret-key-minimum-32-chars!!".to_string()
            } else {
                panic!("JWT_SECRET environment variable must be set in production");
            }
        });

        if jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            panic!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LENGTH
            );
        }

        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            jwt_secret,
            jwt_expiration_hours: lifetime(
                parse_env("JWT_EXPIRATION_HOURS"),
                DEFAULT_JWT_EXPIRATION_HOURS,
                MAX_JWT_EXPIRATION_HOURS,
            ),
            password_reset_timeout_seconds: lifetime(
                parse_env("PASSWORD_RESET_TIMEOUT_SECONDS"),
                DEFAULT_PASSWORD_RESET_TIMEOUT_SECONDS,
                MAX_PASSWORD_RESET_TIMEOUT_SECONDS,
            ),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| DEFAULT_FRONTEND_URL.to_string()),
            server_host: env::var("SERVER_HOST")
                .unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            server_port: parse_env("SERVER_PORT").unwrap_or(DEFAULT_SERVER_PORT),
            email: EmailSettings::from_env(),
        }
    }

    /// Build a configuration with defaults and an explicit secret.
    ///
    /// Used by tests and tools that must not read the process environment.
    pub fn with_secret(jwt_secret: impl Into<String>) -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            jwt_secret: jwt_secret.into(),
            jwt_expiration_hours: DEFAULT_JWT_EXPIRATION_HOURS,
            password_reset_timeout_seconds: DEFAULT_PASSWORD_RESET_TIMEOUT_SECONDS,
            frontend_url: DEFAULT_FRONTEND_URL.to_string(),
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
            email: EmailSettings::default(),
        }
    }

    /// Get JWT secret bytes for token signing/verification.
    pub fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_env<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}

/// Token lifetimes are kept within `1..=max` so expiry arithmetic cannot overflow.
fn lifetime(raw: Option<i64>, default: i64, max: i64) -> i64 {
    match raw {
        Some(value) if !(1..=max).contains(&value) => {
            let clamped = value.clamp(1, max);
            tracing::warn!(value, clamped, "Token lifetime out of range, clamping");
            clamped
        }
        Some(value) => value,
        None => default,
    }
}
