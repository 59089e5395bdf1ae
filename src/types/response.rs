use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{User, UserSummary};

/// Message-only response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Password has been reset successfully.")]
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Administrative listing of accounts
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserListResponse {
    /// Number of entries in `users`
    pub count: usize,
    pub users: Vec<UserSummary>,
}

impl From<Vec<User>> for UserListResponse {
    fn from(users: Vec<User>) -> Self {
        let users: Vec<UserSummary> = users.into_iter().map(UserSummary::from).collect();
        Self {
            count: users.len(),
            users,
        }
    }
}
