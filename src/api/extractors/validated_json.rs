//! Validated JSON extractor - Combines deserialization with validation.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::errors::{AppError, FieldErrors};

/// JSON body that has been deserialized and passed its `Validate` rules.
///
/// Rule violations are returned as a per-field error map; a body that does
/// not parse at all is reported under `non_field_errors`.
///
/// ```rust,ignore
/// #[derive(Deserialize, Validate)]
/// struct ResetRequest {
///     #[validate(email)]
///     email: String,
/// }
///
/// async fn handler(ValidatedJson(payload): ValidatedJson<ResetRequest>) {}
/// ```
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::non_field(e.body_text()))?;

        value
            .validate()
            .map_err(|e| AppError::Validation(FieldErrors::from(&e)))?;

        Ok(ValidatedJson(value))
    }
}
