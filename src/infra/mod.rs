//! Infrastructure layer - External systems integration
//!
//! This module handles all external system concerns:
//! - Database connections and migrations
//! - User persistence
//! - Outbound email

pub mod db;
pub mod mailer;
pub mod repositories;

pub use db::{Database, Migrator};
pub use mailer::{
    mailer_from_settings, EmailAttachment, LogMailer, Mailer, OutgoingEmail, SmtpMailer,
};
pub use repositories::{email_taken, UserRepository, UserStore};

#[cfg(any(test, feature = "test-utils"))]
pub use mailer::MockMailer;
#[cfg(any(test, feature = "test-utils"))]
pub use repositories::MockUserRepository;
