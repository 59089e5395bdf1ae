//! Password reset handlers.

use axum::{extract::State, response::Json, routing::post, Router};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::config::{RESET_CONFIRM_MESSAGE, RESET_REQUEST_MESSAGE};
use crate::errors::AppResult;
use crate::services::ResetConfirmation;
use crate::types::MessageResponse;

/// Reset link request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PasswordResetRequest {
    #[validate(email(message = "Enter a valid email address."))]
    #[schema(example = "a@x.com")]
    pub email: String,
}

/// New password submitted from the reset link
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PasswordResetConfirmRequest {
    /// Identity reference from the link
    #[validate(length(min = 1, message = "This field may not be blank."))]
    pub uid: String,
    /// Reset token from the link
    #[validate(length(min = 1, message = "This field may not be blank."))]
    pub token: String,
    #[schema(example = "Brandnew-pass9")]
    pub new_password: String,
    #[schema(example = "Brandnew-pass9")]
    pub re_new_password: String,
}

/// Create password reset routes
pub fn password_reset_routes() -> Router<AppState> {
    Router::new()
        .route("/password-reset/", post(request_reset))
        .route("/password-reset/confirm/", post(confirm_reset))
}

/// Request a reset email
///
/// The response is the same whether or not the address has an account.
#[utoipa::path(
    post,
    path = "/api/user/password-reset/",
    tag = "Password reset",
    request_body = PasswordResetRequest,
    responses(
        (status = 200, description = "Request accepted", body = MessageResponse),
        (status = 400, description = "Malformed email"),
        (status = 500, description = "The email could not be sent")
    )
)]
pub async fn request_reset(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<PasswordResetRequest>,
) -> AppResult<Json<MessageResponse>> {
    state
        .password_reset_service
        .request_reset(payload.email)
        .await?;

    Ok(Json(MessageResponse::new(RESET_REQUEST_MESSAGE)))
}

/// Set a new password using a reset link
#[utoipa::path(
    post,
    path = "/api/user/password-reset/confirm/",
    tag = "Password reset",
    request_body = PasswordResetConfirmRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Mismatch, weak password, or invalid link")
    )
)]
pub async fn confirm_reset(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<PasswordResetConfirmRequest>,
) -> AppResult<Json<MessageResponse>> {
    state
        .password_reset_service
        .confirm_reset(ResetConfirmation {
            uid: payload.uid,
            token: payload.token,
            new_password: payload.new_password,
            re_new_password: payload.re_new_password,
        })
        .await?;

    Ok(Json(MessageResponse::new(RESET_CONFIRM_MESSAGE)))
}
