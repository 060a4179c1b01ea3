use async_trait::async_trait;

use super::{Notifier, OtpMessage};

/// Writes deliveries to the log instead of sending mail. Used in development
/// and tests, where codes are read back from the database.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_otp(&self, message: &OtpMessage) -> anyhow::Result<()> {
        tracing::info!(
            to = %message.to,
            purpose = %message.purpose,
            subject = message.subject(),
            "OTP email suppressed (log backend)"
        );
        Ok(())
    }
}
