//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on abstractions (traits) for
//! dependency inversion.

mod account_service;
mod auth_service;
pub mod container;
mod password_reset_service;
mod reset_token;

// Service Container
pub use container::{ServiceContainer, Services};

// Service traits and implementations
pub use account_service::{AccountManager, AccountService, ProfileChanges, Registration};
pub use auth_service::{AuthService, Authenticator, Claims, TokenResponse};
pub use password_reset_service::{PasswordResetManager, PasswordResetService, ResetConfirmation};
pub use reset_token::{ResetTokenError, ResetTokens};

#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
