//! Registration and token handlers.

use std::borrow::Cow;

use axum::{extract::State, http::StatusCode, response::Json, routing::post, Router};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::domain::identity::{self, parse_gender};
use crate::domain::RegisteredUser;
use crate::errors::{AppError, AppResult};
use crate::services::{Registration, TokenResponse};

const DATE_FORMAT_MESSAGE: &str =
    "Date has wrong format. Use one of these formats instead: YYYY-MM-DD.";

/// Account registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    /// Email address (unique)
    #[validate(email(message = "Enter a valid email address."))]
    #[schema(example = "a@x.com")]
    pub email: String,
    /// Password (minimum 8 characters)
    #[validate(length(
        min = 8,
        message = "Ensure this field has at least 8 characters."
    ))]
    #[schema(example = "Testpass123", min_length = 8)]
    pub password: String,
    /// Display name
    #[validate(length(
        min = 1,
        max = 255,
        message = "This field may not be blank."
    ))]
    #[schema(example = "A")]
    pub name: String,
    /// Gender code: `M` or `F`
    #[validate(
        required(message = "This field is required."),
        custom(function = "validate_gender")
    )]
    #[schema(example = "F")]
    pub gender: Option<String>,
    /// Birth date as `YYYY-MM-DD`; the applicant must be at least 12
    #[validate(
        required(message = "This field is required."),
        custom(function = "validate_birth_date")
    )]
    #[schema(example = "2000-01-31")]
    pub birth_date: Option<String>,
}

/// Credentials exchanged for a bearer token
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Enter a valid email address."))]
    #[schema(example = "a@x.com")]
    pub email: String,
    #[schema(example = "Testpass123")]
    pub password: String,
}

fn validation_error(code: &'static str, message: String) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Owned(message));
    err
}

fn validate_gender(gender: &str) -> Result<(), ValidationError> {
    parse_gender(Some(gender))
        .map(|_| ())
        .map_err(|e| validation_error("gender", e.to_string()))
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

fn validate_birth_date(raw: &str) -> Result<(), ValidationError> {
    let birth = parse_date(raw)
        .ok_or_else(|| validation_error("date_format", DATE_FORMAT_MESSAGE.to_string()))?;

    identity::validate_birth_date(birth, identity::today())
        .map(|_| ())
        .map_err(|e| validation_error("birth_date", e.to_string()))
}

/// Create authentication routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/create/", post(create_user))
        .route("/token/", post(obtain_token))
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/api/user/create/",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = RegisteredUser),
        (status = 400, description = "Validation error, including a taken email")
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<RegisteredUser>)> {
    let birth_date = match payload.birth_date.as_deref() {
        Some(raw) => Some(
            parse_date(raw).ok_or_else(|| AppError::validation("birth_date", DATE_FORMAT_MESSAGE))?,
        ),
        None => None,
    };

    let user = state
        .account_service
        .register(Registration {
            email: payload.email,
            password: payload.password,
            name: payload.name,
            gender: payload.gender,
            birth_date,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(RegisteredUser::from(user))))
}

/// Obtain a bearer token
#[utoipa::path(
    post,
    path = "/api/user/token/",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 400, description = "Unable to authenticate with provided credentials")
    )
)]
pub async fn obtain_token(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let token = state
        .auth_service
        .login(payload.email, payload.password)
        .await?;

    Ok(Json(token))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(gender: Option<&str>, birth_date: Option<&str>) -> RegisterRequest {
        RegisterRequest {
            email: "a@x.com".to_string(),
            password: "Testpass123".to_string(),
            name: "A".to_string(),
            gender: gender.map(str::to_string),
            birth_date: birth_date.map(str::to_string),
        }
    }

    #[test]
    fn test_register_request_requires_personal_fields() {
        let errors = request(None, None).validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("gender"));
        assert!(fields.contains_key("birth_date"));
    }

    #[test]
    fn test_register_request_rejects_bad_values() {
        let errors = request(Some("X"), Some("31-01-2000")).validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("gender"));
        assert_eq!(
            fields["birth_date"][0].message.as_deref(),
            Some(DATE_FORMAT_MESSAGE)
        );
    }

    #[test]
    fn test_register_request_accepts_valid_adult() {
        assert!(request(Some("M"), Some("1990-05-17")).validate().is_ok());
    }

    #[test]
    fn test_login_request_requires_email_shape() {
        let login = |email: &str| LoginRequest {
            email: email.to_string(),
            password: "Testpass123".to_string(),
        };

        let errors = login("not-an-email").validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
        assert!(login("a@x.com").validate().is_ok());
    }
}
