//! User domain entity and related types.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Gender values accepted at registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

impl Gender {
    /// Single-letter code stored in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "M",
            Gender::Female => "F",
        }
    }
}

impl FromStr for Gender {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "M" => Ok(Gender::Male),
            "F" => Ok(Gender::Female),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub gender: Option<Gender>,
    pub birth_date: Option<NaiveDate>,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Administrative accounts are exempt from the personal-field policy
    /// and may list other accounts.
    pub fn is_admin(&self) -> bool {
        self.is_staff || self.is_superuser
    }

    /// Update user's name
    pub fn update_name(&mut self, name: String) {
        self.name = name;
        self.updated_at = Utc::now();
    }

    /// Replace the stored password hash
    pub fn set_password_hash(&mut self, hash: String) {
        self.password_hash = hash;
        self.updated_at = Utc::now();
    }
}

/// Data needed to persist a new account.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub gender: Option<Gender>,
    pub birth_date: Option<NaiveDate>,
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl NewUser {
    /// Regular self-registered account
    pub fn regular(
        email: String,
        password_hash: String,
        name: String,
        gender: Gender,
        birth_date: NaiveDate,
    ) -> Self {
        Self {
            email,
            password_hash,
            name,
            gender: Some(gender),
            birth_date: Some(birth_date),
            is_staff: false,
            is_superuser: false,
        }
    }

    /// Administrative account without personal fields
    pub fn superuser(email: String, password_hash: String, name: String) -> Self {
        Self {
            email,
            password_hash,
            name,
            gender: None,
            birth_date: None,
            is_staff: true,
            is_superuser: true,
        }
    }
}

/// Account returned after registration (never includes the password)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisteredUser {
    /// Unique user identifier
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    /// Normalized email address
    #[schema(example = "a@x.com")]
    pub email: String,
    /// Display name
    #[schema(example = "A")]
    pub name: String,
    /// Gender code
    pub gender: Option<Gender>,
    /// Birth date (YYYY-MM-DD)
    pub birth_date: Option<NaiveDate>,
}

impl From<User> for RegisteredUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            gender: user.gender,
            birth_date: user.birth_date,
        }
    }
}

/// Own-profile view: email and name only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProfileResponse {
    #[schema(example = "a@x.com")]
    pub email: String,
    #[schema(example = "A")]
    pub name: String,
}

impl From<User> for ProfileResponse {
    fn from(user: User) -> Self {
        Self {
            email: user.email,
            name: user.name,
        }
    }
}

/// Row of the administrative user listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserSummary {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> User {
        User {
            id: Uuid::new_v4(),
            email: "a@x.com".into(),
            password_hash: "hash".into(),
            name: "A".into(),
            gender: Some(Gender::Female),
            birth_date: NaiveDate::from_ymd_opt(2000, 1, 1),
            is_active: true,
            is_staff: false,
            is_superuser: false,
            last_login: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_gender_codes() {
        assert_eq!("M".parse::<Gender>(), Ok(Gender::Male));
        assert_eq!("F".parse::<Gender>(), Ok(Gender::Female));
        assert!("X".parse::<Gender>().is_err());
        assert_eq!(serde_json::to_string(&Gender::Female).unwrap(), "\"F\"");
    }

    #[test]
    fn test_profile_has_only_email_and_name() {
        let json = serde_json::to_value(ProfileResponse::from(sample())).unwrap();
        let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["email".to_string(), "name".to_string()]);
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert!(!json.contains("password_hash"));
    }

    #[test]
    fn test_superuser_is_admin() {
        let mut user = sample();
        assert!(!user.is_admin());
        user.is_superuser = true;
        assert!(user.is_admin());
    }
}
