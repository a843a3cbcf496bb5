//! Slack and Discord webhook notifications

use std::fmt;
use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::{Value, json};

use super::{PassOutcome, SyncObserver};
use crate::{Error, Result};

const BOT_NAME: &str = "Obsidian Sync Bot";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookKind {
    Slack,
    Discord,
}

impl fmt::Display for WebhookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebhookKind::Slack => write!(f, "slack"),
            WebhookKind::Discord => write!(f, "discord"),
        }
    }
}

impl WebhookKind {
    /// JSON body the service expects for a plain message.
    pub fn payload(&self, message: &str) -> Value {
        match self {
            WebhookKind::Slack => json!({ "text": message, "username": BOT_NAME }),
            WebhookKind::Discord => json!({ "content": message, "username": BOT_NAME }),
        }
    }
}

/// Posts pass outcomes to a chat webhook.
pub struct WebhookObserver {
    kind: WebhookKind,
    url: String,
    client: Client,
    notify_on_success: bool,
    notify_on_error: bool,
}

impl WebhookObserver {
    pub fn new(
        kind: WebhookKind,
        url: &str,
        notify_on_success: bool,
        notify_on_error: bool,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|err| Error::Connectivity {
                endpoint: url.to_string(),
                status: None,
                message: err.to_string(),
            })?;

        Ok(Self {
            kind,
            url: url.to_string(),
            client,
            notify_on_success,
            notify_on_error,
        })
    }

    /// The message to send for an outcome, if the policy calls for one.
    ///
    /// Successful passes are reported only when they changed something;
    /// passes with skipped paths count as errors.
    pub fn message_for(&self, outcome: &PassOutcome<'_>) -> Option<String> {
        match outcome {
            PassOutcome::Failed(err) if self.notify_on_error => {
                Some(format!("Obsidian sync failed: {err}"))
            }
            PassOutcome::Completed(result) if result.has_failures() && self.notify_on_error => {
                Some(format!(
                    "Obsidian sync finished with problems: {}",
                    result.summary_line()
                ))
            }
            PassOutcome::Completed(result)
                if result.total_changes() > 0 && self.notify_on_success =>
            {
                Some(format!("Obsidian sync completed: {}", result.summary_line()))
            }
            _ => None,
        }
    }
}

impl SyncObserver for WebhookObserver {
    fn name(&self) -> &str {
        match self.kind {
            WebhookKind::Slack => "slack",
            WebhookKind::Discord => "discord",
        }
    }

    fn observe(&self, outcome: &PassOutcome<'_>) -> Result<()> {
        let Some(message) = self.message_for(outcome) else {
            return Ok(());
        };

        let response = self
            .client
            .post(&self.url)
            .json(&self.kind.payload(&message))
            .send()
            .map_err(|err| Error::Connectivity {
                endpoint: self.kind.to_string(),
                status: None,
                message: err.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Connectivity {
                endpoint: self.kind.to_string(),
                status: Some(status.as_u16()),
                message: format!("webhook answered {status}"),
            });
        }
        tracing::debug!(webhook = %self.kind, "sent notification");
        Ok(())
    }
}
