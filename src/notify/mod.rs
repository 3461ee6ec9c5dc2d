//! Notification channels and the dispatcher that fans out to them.

pub mod email;
pub mod sms;

pub use email::EmailNotifier;
pub use sms::SmsNotifier;

use async_trait::async_trait;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::error::ChannelError;

pub const ALERT_SUBJECT: &str = "System Resource Alert";
pub const REPORT_SUBJECT: &str = "System Resource Report";

/// One outbound transport. Implementations must not retry internally;
/// the dispatcher surfaces failures and the scheduler moves on.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, subject: &str, body: &str) -> Result<(), ChannelError>;

    fn name(&self) -> &'static str;
}

/// Per-channel result of one dispatch call.
#[derive(Debug)]
pub struct ChannelOutcome {
    pub channel: &'static str,
    pub result: Result<(), ChannelError>,
}

impl ChannelOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Fans a message out to every configured channel. Channels are
/// attempted concurrently and independently: one channel failing or
/// stalling never blocks a sibling, and every send is bounded by the
/// configured timeout. Failures come back in the outcome list, never as
/// an error from the dispatch call itself.
pub struct NotificationDispatcher {
    channels: Vec<Arc<dyn Notifier>>,
    send_timeout: Duration,
}

impl NotificationDispatcher {
    pub fn new(channels: Vec<Arc<dyn Notifier>>, send_timeout: Duration) -> Self {
        Self {
            channels,
            send_timeout,
        }
    }

    /// Debounced alert path. The caller has already decided to dispatch.
    pub async fn send_alert(&self, body: &str) -> Vec<ChannelOutcome> {
        self.send_all(ALERT_SUBJECT, body).await
    }

    /// Report path; bypasses the debouncer entirely.
    pub async fn send_report(&self, body: &str) -> Vec<ChannelOutcome> {
        self.send_all(REPORT_SUBJECT, body).await
    }

    async fn send_all(&self, subject: &str, body: &str) -> Vec<ChannelOutcome> {
        let attempts = self.channels.iter().map(|channel| {
            let name = channel.name();
            async move {
                info!(channel = name, subject, "dispatching notification");
                let result =
                    match tokio::time::timeout(self.send_timeout, channel.send(subject, body))
                        .await
                    {
                        Ok(Ok(())) => {
                            info!(channel = name, "notification sent");
                            Ok(())
                        }
                        Ok(Err(e)) => {
                            warn!(channel = name, error = %e, "notification failed");
                            Err(e)
                        }
                        Err(_) => {
                            let e = ChannelError::new(
                                name,
                                format!("send timed out after {:?}", self.send_timeout),
                            );
                            warn!(channel = name, error = %e, "notification timed out");
                            Err(e)
                        }
                    };
                ChannelOutcome {
                    channel: name,
                    result,
                }
            }
        });

        join_all(attempts).await
    }
}
