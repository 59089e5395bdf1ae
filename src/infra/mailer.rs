//! Outbound email.
//!
//! When SMTP is configured, mail goes out through lettre's async SMTP
//! transport. Debug builds without SMTP fall back to logging the envelope
//! (never the body, which can carry reset credentials).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Attachment, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::EmailSettings;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// A file sent alongside the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAttachment {
    pub filename: String,
    /// MIME type, e.g. `image/png`
    pub content_type: String,
    pub content: Vec<u8>,
}

impl EmailAttachment {
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        content: Vec<u8>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            content,
        }
    }
}

/// A plain-text message with optional attachments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    /// Recipient email address
    pub to: String,
    /// Email subject line
    pub subject: String,
    /// Plain-text body
    pub body: String,
    pub attachments: Vec<EmailAttachment>,
}

impl OutgoingEmail {
    pub fn new(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
            attachments: Vec::new(),
        }
    }

    pub fn with_attachment(mut self, attachment: EmailAttachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Look up an attachment by file name.
    pub fn attachment(&self, filename: &str) -> Option<&EmailAttachment> {
        self.attachments.iter().find(|a| a.filename == filename)
    }
}

/// Delivery seam for outbound mail.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver one message. Errors surface as [`AppError::EmailDispatch`].
    async fn send(&self, email: OutgoingEmail) -> AppResult<()>;
}

/// SMTP delivery via lettre.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpMailer {
    /// Build a transport from settings. Fails if no host is configured.
    pub fn new(settings: &EmailSettings) -> AppResult<Self> {
        let host = settings
            .smtp_host
            .as_deref()
            .ok_or_else(|| AppError::internal("SMTP_HOST is not configured"))?;

        let builder = if settings.smtp_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                .map_err(|e| AppError::EmailDispatch(e.to_string()))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
        };

        let mut builder = builder
            .port(settings.smtp_port)
            .timeout(Some(Duration::from_secs(settings.timeout_seconds)));

        if let Some(user) = &settings.smtp_user {
            let creds = Credentials::new(
                user.clone(),
                settings.smtp_password().unwrap_or_default().to_string(),
            );
            builder = builder.credentials(creds);
        }

        Ok(Self {
            transport: builder.build(),
            from: settings.from_email.clone(),
        })
    }
}

/// Build the MIME message: a plain body, or `multipart/mixed` when there are attachments.
fn build_message(from: &str, email: OutgoingEmail) -> AppResult<Message> {
    let builder = Message::builder()
        .from(
            from.parse::<Mailbox>()
                .map_err(|e| AppError::EmailDispatch(format!("invalid sender: {e}")))?,
        )
        .to(email
            .to
            .parse::<Mailbox>()
            .map_err(|e| AppError::EmailDispatch(format!("invalid recipient: {e}")))?)
        .subject(email.subject);

    let message = if email.attachments.is_empty() {
        builder.header(ContentType::TEXT_PLAIN).body(email.body)
    } else {
        let mut parts = MultiPart::mixed().singlepart(SinglePart::plain(email.body));
        for attachment in email.attachments {
            let content_type = ContentType::parse(&attachment.content_type).map_err(|e| {
                AppError::EmailDispatch(format!("invalid attachment type: {e}"))
            })?;
            parts = parts.singlepart(
                Attachment::new(attachment.filename).body(attachment.content, content_type),
            );
        }
        builder.multipart(parts)
    };

    message.map_err(|e| AppError::EmailDispatch(e.to_string()))
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutgoingEmail) -> AppResult<()> {
        let to = email.to.clone();
        let message = build_message(&self.from, email)?;

        self.transport
            .send(message)
            .await
            .map_err(|e| AppError::EmailDispatch(e.to_string()))?;

        tracing::info!(to = %to, "Email sent");
        Ok(())
    }
}

/// Writes messages to the log instead of sending them.
pub struct LogMailer {
    from: String,
}

impl LogMailer {
    pub fn new(from: impl Into<String>) -> Self {
        Self { from: from.into() }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: OutgoingEmail) -> AppResult<()> {
        tracing::warn!(
            from = %self.from,
            to = %email.to,
            subject = %email.subject,
            attachments = email.attachments.len(),
            "SMTP not configured, email not sent (body withheld)"
        );
        Ok(())
    }
}

/// Pick the SMTP transport when configured.
///
/// Without SMTP, debug builds log the envelope instead and release builds
/// refuse to start.
pub fn mailer_from_settings(settings: &EmailSettings) -> AppResult<Arc<dyn Mailer>> {
    if settings.is_configured() {
        Ok(Arc::new(SmtpMailer::new(settings)?))
    } else if cfg!(debug_assertions) {
        tracing::warn!("SMTP_HOST not set, emails will be logged instead of sent");
        Ok(Arc::new(LogMailer::new(settings.from_email.clone())))
    } else {
        Err(AppError::internal(
            "SMTP_HOST environment variable must be set in production",
        ))
    }
}
