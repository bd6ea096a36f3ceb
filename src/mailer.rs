use async_trait::async_trait;
use tracing::info;

/// Delivery collaborator for password-reset links. The plaintext reset token
/// is handed over here and nowhere else; implementations must not log it.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_password_reset(&self, email: &str, reset_token: &str) -> anyhow::Result<()>;
}

/// Development mailer: records that a reset was requested without sending
/// anything. The token itself is kept out of the logs.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_password_reset(&self, email: &str, _reset_token: &str) -> anyhow::Result<()> {
        info!(email = %email, "password reset email queued");
        Ok(())
    }
}
