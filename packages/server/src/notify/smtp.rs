use anyhow::Context;
use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::{Notifier, OtpMessage};
use crate::config::EmailConfig;

/// Sends codes through an SMTP relay over implicit TLS.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotifier {
    pub fn new(config: &EmailConfig) -> anyhow::Result<Self> {
        let from: Mailbox = config
            .from
            .parse()
            .with_context(|| format!("invalid sender address {:?}", config.from))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
            .with_context(|| format!("invalid SMTP host {:?}", config.host))?
            .port(config.port);
        if !config.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ));
        }

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send_otp(&self, message: &OtpMessage) -> anyhow::Result<()> {
        let to: Mailbox = message
            .to
            .parse()
            .with_context(|| format!("invalid recipient {:?}", message.to))?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(message.subject())
            .body(message.body())
            .context("failed to build OTP email")?;

        self.transport
            .send(email)
            .await
            .context("SMTP relay rejected OTP email")?;
        tracing::debug!(to = %message.to, purpose = %message.purpose, "OTP email sent");
        Ok(())
    }
}
