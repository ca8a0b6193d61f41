/// Transactional email bodies
///
/// Inline HTML strings; there is no template engine. Keep markup simple
/// enough to survive the common mail clients.

/// Subject line for the welcome email
pub const WELCOME_SUBJECT: &str = "Welcome to TaskFlow!";

/// Subject line for the password reset email
pub const PASSWORD_RESET_SUBJECT: &str = "Password Reset Request - TaskFlow";

/// Body of the welcome email sent after registration
pub fn welcome_email(username: &str) -> String {
    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h2 style="color: #3b82f6;">Welcome to TaskFlow!</h2>
  <p>Hello <strong>{username}</strong>,</p>
  <p>Welcome to TaskFlow! We're excited to have you on board.</p>
  <p>Here's what you can do with TaskFlow:</p>
  <ul>
    <li>Create and manage personal tasks</li>
    <li>Create families and collaborate with members</li>
    <li>Track your progress with detailed analytics</li>
    <li>Generate weekly reports</li>
  </ul>
  <p>Happy task managing!</p>
</div>"#
    )
}

/// Body of the password reset email
pub fn password_reset(username: &str, reset_url: &str) -> String {
    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h2 style="color: #3b82f6;">Password Reset Request</h2>
  <p>Hello <strong>{username}</strong>,</p>
  <p>You requested a password reset for your TaskFlow account.</p>
  <p>Click the button below to reset your password:</p>
  <div style="text-align: center; margin: 30px 0;">
    <a href="{reset_url}" style="background-color: #3b82f6; color: white; padding: 12px 24px; text-decoration: none; border-radius: 5px; display: inline-block;">Reset Password</a>
  </div>
  <p>This link will expire in 1 hour.</p>
  <p>If you didn't request this, please ignore this email.</p>
</div>"#
    )
}
