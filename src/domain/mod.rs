//! Domain layer - Core business entities and logic
//!
//! This module contains the core domain models that represent
//! business concepts independent of infrastructure concerns.

pub mod identity;
pub mod password;
pub mod user;

pub use identity::{age_on, check_personal_fields, normalize_email, validate_birth_date, IdentityError};
pub use password::Password;
pub use user::{Gender, NewUser, ProfileResponse, RegisteredUser, User, UserSummary};
