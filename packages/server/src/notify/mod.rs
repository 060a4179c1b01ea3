mod log;
mod smtp;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

pub use log::LogNotifier;
pub use smtp::SmtpNotifier;

use crate::config::{EmailBackend, EmailConfig};

/// Why a one-time code was sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpPurpose {
    Activation,
    PasswordReset,
}

impl fmt::Display for OtpPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OtpPurpose::Activation => f.write_str("activation"),
            OtpPurpose::PasswordReset => f.write_str("password_reset"),
        }
    }
}

/// A one-time code addressed to an account's email.
#[derive(Debug, Clone)]
pub struct OtpMessage {
    pub to: String,
    pub code: String,
    pub purpose: OtpPurpose,
}

impl OtpMessage {
    pub fn subject(&self) -> &'static str {
        match self.purpose {
            OtpPurpose::Activation => "Verify your email address",
            OtpPurpose::PasswordReset => "Reset your password",
        }
    }

    pub fn body(&self) -> String {
        match self.purpose {
            OtpPurpose::Activation => format!(
                "This mail was sent because you just signed up.\n\nYour verification code is:\n\n{}\n",
                self.code
            ),
            OtpPurpose::PasswordReset => format!(
                "A password reset was requested for this address.\n\nYour reset code is:\n\n{}\n\nIgnore this mail if you did not ask for it.\n",
                self.code
            ),
        }
    }
}

/// Outbound channel for one-time codes. Delivery is one-way: callers never
/// learn whether the message arrived.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_otp(&self, message: &OtpMessage) -> anyhow::Result<()>;
}

/// Hand a message to the notifier without waiting for delivery.
pub fn dispatch_otp(notifier: Arc<dyn Notifier>, message: OtpMessage) {
    tokio::spawn(async move {
        if let Err(e) = notifier.send_otp(&message).await {
            tracing::warn!(to = %message.to, purpose = %message.purpose, "OTP delivery failed: {e:#}");
        }
    });
}

/// Build the notifier selected by `email.backend`.
pub fn build_notifier(config: &EmailConfig) -> anyhow::Result<Arc<dyn Notifier>> {
    Ok(match config.backend {
        EmailBackend::Smtp => Arc::new(SmtpNotifier::new(config)?),
        EmailBackend::Log => Arc::new(LogNotifier),
    })
}
