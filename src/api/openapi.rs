//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{auth_handler, password_reset_handler, user_handler};
use crate::domain::{Gender, ProfileResponse, RegisteredUser, UserSummary};
use crate::services::TokenResponse;
use crate::types::{MessageResponse, UserListResponse};

/// OpenAPI documentation for the accounts API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Accounts API",
        version = "0.1.0",
        description = "User registration, bearer-token login, profiles and password reset"
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        auth_handler::create_user,
        auth_handler::obtain_token,
        user_handler::get_profile,
        user_handler::update_profile,
        user_handler::list_users,
        password_reset_handler::request_reset,
        password_reset_handler::confirm_reset,
    ),
    components(
        schemas(
            Gender,
            RegisteredUser,
            ProfileResponse,
            UserSummary,
            UserListResponse,
            MessageResponse,
            TokenResponse,
            auth_handler::RegisterRequest,
            auth_handler::LoginRequest,
            user_handler::UpdateProfileRequest,
            password_reset_handler::PasswordResetRequest,
            password_reset_handler::PasswordResetConfirmRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration and bearer tokens"),
        (name = "Users", description = "Own profile and staff listing"),
        (name = "Password reset", description = "Email-based password reset")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token obtained from /api/user/token/"))
                        .build(),
                ),
            );
        }
    }
}
