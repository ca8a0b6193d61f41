/// Outbound email for TaskFlow
///
/// # Modules
///
/// - `mailer`: async SMTP transport with a log-only fallback
/// - `templates`: inline HTML bodies for the transactional emails
///
/// Email is strictly best-effort: delivery failures are logged and never
/// fail the request that triggered them.

pub mod mailer;
pub mod templates;

pub use mailer::{Mailer, SmtpConfig};
