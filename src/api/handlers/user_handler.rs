//! Profile and administrative listing handlers.

use axum::{
    extract::{Extension, State},
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{require_admin, CurrentUser};
use crate::api::AppState;
use crate::domain::ProfileResponse;
use crate::errors::AppResult;
use crate::services::ProfileChanges;
use crate::types::UserListResponse;

/// Partial profile update; omitted fields are left unchanged
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    /// New display name
    #[validate(length(
        min = 1,
        max = 255,
        message = "This field may not be blank."
    ))]
    #[schema(example = "B")]
    pub name: Option<String>,
    /// New password (minimum 8 characters)
    #[validate(length(
        min = 8,
        message = "Ensure this field has at least 8 characters."
    ))]
    #[schema(example = "Newpass123")]
    pub password: Option<String>,
}

/// Create routes that require an authenticated caller
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/moi/", get(get_profile).patch(update_profile))
        .route("/get_users/", get(list_users))
}

/// Get own profile
#[utoipa::path(
    get,
    path = "/api/user/moi/",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Own profile", body = ProfileResponse),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn get_profile(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> AppResult<Json<ProfileResponse>> {
    Ok(Json(ProfileResponse::from(user)))
}

/// Update own name and/or password
#[utoipa::path(
    patch,
    path = "/api/user/moi/",
    tag = "Users",
    security(("bearer_auth" = [])),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = ProfileResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn update_profile(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<UpdateProfileRequest>,
) -> AppResult<Json<ProfileResponse>> {
    let updated = state
        .account_service
        .update_profile(
            user.id,
            ProfileChanges {
                name: payload.name,
                password: payload.password,
            },
        )
        .await?;

    Ok(Json(ProfileResponse::from(updated)))
}

/// List every non-superuser account (staff only)
#[utoipa::path(
    get,
    path = "/api/user/get_users/",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Accounts with count", body = UserListResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Forbidden - staff only")
    )
)]
pub async fn list_users(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<Json<UserListResponse>> {
    require_admin(&current_user)?;
    let users = state.account_service.list_users().await?;
    Ok(Json(UserListResponse::from(users)))
}
