//! Bearer token authentication middleware.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::api::AppState;
use crate::config::{BEARER_TOKEN_PREFIX, TOKEN_AUTH_PREFIX};
use crate::domain::User;
use crate::errors::AppError;

/// Authenticated caller, loaded fresh from the store on every request.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.0.is_admin()
    }
}

/// Validate the `Authorization` header and inject [`CurrentUser`].
///
/// Both `Bearer <token>` and `Token <token>` are accepted. Deleted or
/// deactivated accounts are rejected even while their token is unexpired.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let token = auth_header
        .strip_prefix(BEARER_TOKEN_PREFIX)
        .or_else(|| auth_header.strip_prefix(TOKEN_AUTH_PREFIX))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AppError::Unauthorized)?;

    let claims = state.auth_service.verify_token(token)?;

    let user = match state.account_service.profile(claims.sub).await {
        Ok(user) if user.is_active => user,
        Ok(_) | Err(AppError::NotFound) => return Err(AppError::Unauthorized),
        Err(e) => return Err(e),
    };

    request.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(request).await)
}

/// Require staff or superuser, returns Forbidden error otherwise.
pub fn require_admin(user: &CurrentUser) -> Result<(), AppError> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}
