//! Identity rules applied to non-administrative accounts.
//!
//! Age is counted in full elapsed years. The reference day is passed in
//! explicitly so callers (and tests) decide what "today" means.

use chrono::{Datelike, NaiveDate, Utc};
use thiserror::Error;

use super::user::Gender;
use crate::config::MIN_AGE_YEARS;
use crate::errors::FieldErrors;

/// Personal-field policy violations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("Birth date is required.")]
    MissingBirthDate,

    #[error("Gender is required.")]
    MissingGender,

    #[error("Gender must be one of: M, F.")]
    InvalidGender,

    #[error("Birth date cannot be in the future.")]
    FutureDate,

    #[error("You must be at least {minimum} years old to create an account. You are currently {age} years old.")]
    Underage { age: i32, minimum: i32 },
}

impl IdentityError {
    /// Input field the error is reported under
    pub fn field(&self) -> &'static str {
        match self {
            IdentityError::MissingGender | IdentityError::InvalidGender => "gender",
            _ => "birth_date",
        }
    }
}

/// Current calendar day (UTC)
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Full years elapsed between `birth` and `today`.
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age
}

/// Reject future dates and ages below the minimum; returns the age.
pub fn validate_birth_date(birth: NaiveDate, today: NaiveDate) -> Result<i32, IdentityError> {
    if birth > today {
        return Err(IdentityError::FutureDate);
    }

    let age = age_on(birth, today);
    if age < MIN_AGE_YEARS {
        return Err(IdentityError::Underage {
            age,
            minimum: MIN_AGE_YEARS,
        });
    }

    Ok(age)
}

/// Parse a gender code, treating blank as absent.
pub fn parse_gender(raw: Option<&str>) -> Result<Gender, IdentityError> {
    match raw.map(str::trim) {
        None | Some("") => Err(IdentityError::MissingGender),
        Some(code) => code.parse().map_err(|_| IdentityError::InvalidGender),
    }
}

/// Check gender and birth date of a non-administrative account.
///
/// Every violation is collected so the caller can report all fields at once.
pub fn check_personal_fields(
    gender: Option<&str>,
    birth_date: Option<NaiveDate>,
    today: NaiveDate,
) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if let Err(e) = parse_gender(gender) {
        errors.add(e.field(), e.to_string());
    }

    let birth_result = match birth_date {
        None => Err(IdentityError::MissingBirthDate),
        Some(birth) => validate_birth_date(birth, today).map(|_| ()),
    };
    if let Err(e) = birth_result {
        errors.add(e.field(), e.to_string());
    }

    errors
}

/// Normalize an email address: trim it and lower-case the domain part.
///
/// The local part is kept as typed, so `Test2@Example.com` becomes
/// `Test2@example.com`.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.to_string(),
    }
}
