//! Email templates.

use super::qr::qr_png;
use crate::domain::User;
use crate::infra::{EmailAttachment, OutgoingEmail};

/// Subject line of the reset email
pub const PASSWORD_RESET_SUBJECT: &str = "Password reset";

/// File name of the QR code attached to the reset email
pub const RESET_QR_FILENAME: &str = "reset_qr.png";

/// Build the password reset email for `user`.
///
/// The link points at the frontend, which posts `uid` and `token` back to
/// the confirm endpoint. A QR code of the link is attached when it can be
/// rendered; otherwise the email goes out without it.
pub fn password_reset_email(
    user: &User,
    uid: &str,
    token: &str,
    frontend_url: &str,
    ttl_seconds: i64,
) -> OutgoingEmail {
    let greeting = if user.name.trim().is_empty() {
        user.email.as_str()
    } else {
        user.name.as_str()
    };
    let link = reset_link(frontend_url, uid, token);

    let body = format!(
        "Hello {greeting},\n\
         \n\
         You're receiving this email because a password reset was requested \
         for your account.\n\
         \n\
         Please go to the following page and choose a new password:\n\
         \n\
         {link}\n\
         \n\
         Your user id: {uid}\n\
         Your reset token: {token}\n\
         \n\
         This link will expire in {expiry}. If you did not request a reset, \
         you can ignore this email.\n",
        expiry = describe_duration(ttl_seconds),
    );

    let email = OutgoingEmail::new(user.email.clone(), PASSWORD_RESET_SUBJECT, body);

    match qr_png(&link) {
        Ok(png) => {
            email.with_attachment(EmailAttachment::new(RESET_QR_FILENAME, "image/png", png))
        }
        Err(e) => {
            tracing::warn!(user_id = %user.id, error = %e, "Could not attach reset QR code");
            email
        }
    }
}

/// `{frontend}/password-reset/confirm/{uid}/{token}`
pub fn reset_link(frontend_url: &str, uid: &str, token: &str) -> String {
    format!(
        "{}/password-reset/confirm/{}/{}",
        frontend_url.trim_end_matches('/'),
        uid,
        token
    )
}

fn describe_duration(seconds: i64) -> String {
    let plural = |n: i64, unit: &str| {
        if n == 1 {
            format!("1 {unit}")
        } else {
            format!("{n} {unit}s")
        }
    };

    if seconds % 3600 == 0 {
        plural(seconds / 3600, "hour")
    } else if seconds % 60 == 0 {
        plural(seconds / 60, "minute")
    } else {
        plural(seconds, "second")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn user(name: &str) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            email: "a@x.com".to_string(),
            password_hash: "hash".to_string(),
            name: name.to_string(),
            gender: None,
            birth_date: None,
            is_active: true,
            is_staff: false,
            is_superuser: false,
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_reset_email_contents() {
        let email = password_reset_email(&user("Alice"), "MQ", "tok.en", "https://app.example/", 3600);

        assert_eq!(email.to, "a@x.com");
        assert_eq!(email.subject, PASSWORD_RESET_SUBJECT);
        assert!(email.body.starts_with("Hello Alice,"));
        assert!(email
            .body
            .contains("https://app.example/password-reset/confirm/MQ/tok.en"));
        assert!(email.body.contains("Your user id: MQ"));
        assert!(email.body.contains("expire in 1 hour."));

        let qr = email.attachment(RESET_QR_FILENAME).expect("QR attachment");
        assert_eq!(qr.content_type, "image/png");
        assert!(qr.content.starts_with(b"\x89PNG"));
    }

    #[test]
    fn test_unrenderable_link_still_sends_email() {
        let frontend = format!("https://app.example/{}", "x".repeat(8000));
        let email = password_reset_email(&user("Alice"), "MQ", "tok.en", &frontend, 3600);

        assert!(email.attachments.is_empty());
        assert!(email.body.contains("/password-reset/confirm/MQ/tok.en"));
    }

    #[test]
    fn test_greeting_falls_back_to_email() {
        let email = password_reset_email(&user("  "), "MQ", "t", "http://localhost:3000", 3600);
        assert!(email.body.starts_with("Hello a@x.com,"));
    }

    #[test]
    fn test_describe_duration() {
        assert_eq!(describe_duration(7200), "2 hours");
        assert_eq!(describe_duration(900), "15 minutes");
        assert_eq!(describe_duration(61), "61 seconds");
    }
}
