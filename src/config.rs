use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

/// Environment variable naming the config file; falls back to
/// `hostwatch.json` in the working directory.
pub const CONFIG_PATH_ENV: &str = "HOSTWATCH_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "hostwatch.json";

/// The full on-disk configuration record: channel credentials, scheduler
/// tuning, and the persisted `last_alert_time`. The whole record is
/// re-read and re-written on every alert-state update, so everything the
/// process persists lives in this one flat structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigRecord {
    /// SMTP relay host
    pub mail_host: String,

    /// SMTP port (STARTTLS)
    #[serde(default = "default_mail_port")]
    pub mail_port: u16,

    /// SMTP login username
    pub mail_username: String,

    /// SMTP login password
    pub mail_password: String,

    /// Sender address for outbound mail
    pub from_email: String,

    /// Recipient address for alerts and reports
    pub to_email: String,

    /// Twilio account SID
    pub sms_account_id: String,

    /// Twilio auth token
    pub sms_auth_token: String,

    /// Originating phone number
    pub sms_from_number: String,

    /// Destination phone number
    pub sms_to_number: String,

    /// Timestamp of the last dispatched alert; RFC 3339, empty string,
    /// or null on disk. Written back by the alert debouncer.
    #[serde(default, deserialize_with = "deserialize_last_alert")]
    pub last_alert_time: Option<DateTime<Utc>>,

    /// Cron expression driving the alert cycle
    #[serde(default = "default_alert_cron")]
    pub alert_cron: String,

    /// Cron expressions driving the full-report cycle
    #[serde(default = "default_report_crons")]
    pub report_crons: Vec<String>,

    /// Minimum minutes between two dispatched alerts
    #[serde(default = "default_cooldown_minutes")]
    pub cooldown_minutes: u64,

    /// CPU sampling window in milliseconds
    #[serde(default = "default_cpu_sample_millis")]
    pub cpu_sample_millis: u64,

    /// Upper bound on any single notification send
    #[serde(default = "default_send_timeout_seconds")]
    pub send_timeout_seconds: u64,
}

fn default_mail_port() -> u16 {
    587
}

fn default_alert_cron() -> String {
    // Every minute; safe to run far more often than the cooldown.
    "0 * * * * *".to_string()
}

fn default_report_crons() -> Vec<String> {
    vec!["0 0 6 * * *".to_string(), "0 0 18 * * *".to_string()]
}

fn default_cooldown_minutes() -> u64 {
    60
}

fn default_cpu_sample_millis() -> u64 {
    1000
}

fn default_send_timeout_seconds() -> u64 {
    30
}

/// Accepts null, the empty string, or an RFC 3339 timestamp.
fn deserialize_last_alert<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref() {
        None | Some("") => Ok(None),
        Some(value) => DateTime::parse_from_rfc3339(value)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(|e| serde::de::Error::custom(format!("invalid last_alert_time: {e}"))),
    }
}

impl ConfigRecord {
    /// Startup validation of everything the channels and scheduler need.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("mail_host", &self.mail_host),
            ("mail_username", &self.mail_username),
            ("mail_password", &self.mail_password),
            ("from_email", &self.from_email),
            ("to_email", &self.to_email),
            ("sms_account_id", &self.sms_account_id),
            ("sms_auth_token", &self.sms_auth_token),
            ("sms_from_number", &self.sms_from_number),
            ("sms_to_number", &self.sms_to_number),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{name} must not be empty")));
            }
        }
        if self.mail_port == 0 {
            return Err(ConfigError::Invalid("mail_port must not be zero".into()));
        }
        if self.report_crons.is_empty() {
            return Err(ConfigError::Invalid(
                "report_crons must name at least one schedule".into(),
            ));
        }
        if self.send_timeout_seconds == 0 {
            return Err(ConfigError::Invalid(
                "send_timeout_seconds must not be zero".into(),
            ));
        }
        Ok(())
    }

    /// Immutable channel configuration handed to the dispatcher at startup.
    pub fn notification_config(&self) -> NotificationConfig {
        NotificationConfig {
            email: EmailConfig {
                host: self.mail_host.clone(),
                port: self.mail_port,
                username: self.mail_username.clone(),
                password: self.mail_password.clone(),
                from: self.from_email.clone(),
                to: self.to_email.clone(),
            },
            sms: SmsConfig {
                account_id: self.sms_account_id.clone(),
                auth_token: self.sms_auth_token.clone(),
                from_number: self.sms_from_number.clone(),
                to_number: self.sms_to_number.clone(),
            },
            send_timeout: Duration::from_secs(self.send_timeout_seconds),
        }
    }

    pub fn cpu_sample_window(&self) -> Duration {
        Duration::from_millis(self.cpu_sample_millis)
    }

    pub fn cooldown(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.cooldown_minutes as i64)
    }
}

#[derive(Debug, Clone)]
pub struct NotificationConfig {
    pub email: EmailConfig,
    pub sms: SmsConfig,
    pub send_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone)]
pub struct SmsConfig {
    pub account_id: String,
    pub auth_token: String,
    pub from_number: String,
    pub to_number: String,
}

/// Resolve the config file path from the environment.
pub fn config_path() -> PathBuf {
    env::var(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}
