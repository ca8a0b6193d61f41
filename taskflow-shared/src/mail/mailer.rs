/// Async SMTP mailer
///
/// A thin wrapper over lettre's tokio SMTP transport, constructed once at
/// process start and injected into the application state. When no SMTP
/// host is configured (the common development setup) the mailer runs in
/// log-only mode: messages are summarized to the log and reported as
/// delivered.
///
/// Delivery failures never propagate to callers; registration and
/// password-reset requests must succeed even when the mail server is down.

use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// SMTP connection settings
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    /// SMTP server hostname
    pub host: String,

    /// SMTP server port
    pub port: u16,

    /// Username for SMTP AUTH
    pub username: String,

    /// Password for SMTP AUTH
    pub password: String,

    /// From address, e.g. `TaskFlow <noreply@taskflow.com>`
    pub from: String,
}

/// Handle to the outbound mail transport
///
/// Cheap to clone; the underlying transport is shared.
#[derive(Clone)]
pub struct Mailer {
    inner: Option<Arc<MailerInner>>,
}

struct MailerInner {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl Mailer {
    /// Connects to an SMTP server using STARTTLS
    ///
    /// # Errors
    ///
    /// Returns an error when the relay parameters or the from address are
    /// invalid. Connection problems only surface later, at send time, and
    /// are logged there.
    pub fn connect(config: SmtpConfig) -> anyhow::Result<Self> {
        let from: Mailbox = config
            .from
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid from address '{}': {}", config.from, e))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            .port(config.port)
            .credentials(Credentials::new(config.username, config.password))
            .build();

        info!(host = %config.host, port = config.port, "SMTP mailer configured");

        Ok(Self {
            inner: Some(Arc::new(MailerInner { transport, from })),
        })
    }

    /// Creates a log-only mailer that records messages instead of sending
    pub fn disabled() -> Self {
        info!("No SMTP transport configured, emails will be logged instead");
        Self { inner: None }
    }

    /// Sends an HTML email, best-effort
    ///
    /// Returns true when the message was sent (or logged in log-only
    /// mode). All failures are logged and reported as false; they are
    /// never errors.
    pub async fn send(&self, to: &str, subject: &str, html: String) -> bool {
        let Some(inner) = &self.inner else {
            info!(to, subject, "Email simulation (no transport configured)");
            debug!(preview = %html.chars().take(100).collect::<String>(), "Email content preview");
            return true;
        };

        let to_mailbox: Mailbox = match to.parse() {
            Ok(mailbox) => mailbox,
            Err(e) => {
                warn!(to, error = %e, "Invalid recipient address, dropping email");
                return false;
            }
        };

        let message = match Message::builder()
            .from(inner.from.clone())
            .to(to_mailbox)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html)
        {
            Ok(message) => message,
            Err(e) => {
                warn!(to, subject, error = %e, "Failed to build email message");
                return false;
            }
        };

        match inner.transport.send(message).await {
            Ok(_) => {
                debug!(to, subject, "Email sent");
                true
            }
            Err(e) => {
                error!(to, subject, error = %e, "Error sending email");
                false
            }
        }
    }
}
