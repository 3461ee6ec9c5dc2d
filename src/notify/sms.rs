//! SMS channel: Twilio Messages REST endpoint.

use async_trait::async_trait;
use reqwest::Client;

use super::Notifier;
use crate::config::SmsConfig;
use crate::error::ChannelError;

const CHANNEL: &str = "sms";
const TWILIO_API_BASE: &str = "https://api.twilio.com/2010-04-01";

pub struct SmsNotifier {
    client: Client,
    config: SmsConfig,
    messages_url: String,
}

impl SmsNotifier {
    pub fn new(config: SmsConfig) -> Self {
        let messages_url = format!(
            "{TWILIO_API_BASE}/Accounts/{}/Messages.json",
            config.account_id
        );
        Self {
            client: Client::new(),
            config,
            messages_url,
        }
    }
}

#[async_trait]
impl Notifier for SmsNotifier {
    /// SMS has no subject line; only the body is delivered.
    async fn send(&self, _subject: &str, body: &str) -> Result<(), ChannelError> {
        let params = [
            ("To", self.config.to_number.as_str()),
            ("From", self.config.from_number.as_str()),
            ("Body", body),
        ];

        let response = self
            .client
            .post(&self.messages_url)
            .basic_auth(&self.config.account_id, Some(&self.config.auth_token))
            .form(&params)
            .send()
            .await
            .map_err(|e| ChannelError::new(CHANNEL, e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let detail = response.text().await.unwrap_or_default();
            Err(ChannelError::new(
                CHANNEL,
                format!("Twilio returned {status}: {detail}"),
            ))
        }
    }

    fn name(&self) -> &'static str {
        CHANNEL
    }
}
