//! Email channel: async SMTP with STARTTLS.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::Notifier;
use crate::config::EmailConfig;
use crate::error::{ChannelError, ConfigError};

const CHANNEL: &str = "email";

#[derive(Debug)]
pub struct EmailNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl EmailNotifier {
    /// Builds the transport up front so address or relay problems are
    /// caught at startup instead of on the first alert.
    pub fn new(config: &EmailConfig) -> Result<Self, ConfigError> {
        let from: Mailbox = config
            .from
            .parse()
            .map_err(|e| ConfigError::Invalid(format!("invalid from_email: {e}")))?;
        let to: Mailbox = config
            .to
            .parse()
            .map_err(|e| ConfigError::Invalid(format!("invalid to_email: {e}")))?;

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| ConfigError::Invalid(format!("invalid mail_host: {e}")))?
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        Ok(Self { mailer, from, to })
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn send(&self, subject: &str, body: &str) -> Result<(), ChannelError> {
        let email = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| ChannelError::new(CHANNEL, e.to_string()))?;

        self.mailer
            .send(email)
            .await
            .map_err(|e| ChannelError::new(CHANNEL, e.to_string()))?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        CHANNEL
    }
}
