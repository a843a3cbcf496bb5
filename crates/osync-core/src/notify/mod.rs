//! Observers notified after every pass

mod webhook;

pub use webhook::{WebhookKind, WebhookObserver};

use crate::config::ProjectConfig;
use crate::sync::SyncResult;
use crate::{Error, Result};

/// What a pass produced.
#[derive(Debug, Clone, Copy)]
pub enum PassOutcome<'a> {
    Completed(&'a SyncResult),
    Failed(&'a Error),
}

/// Consumer of pass outcomes.
pub trait SyncObserver {
    fn name(&self) -> &str;

    fn observe(&self, outcome: &PassOutcome<'_>) -> Result<()>;
}

/// Observer backed by a closure.
pub struct FnObserver<F> {
    name: String,
    callback: F,
}

impl<F> FnObserver<F>
where
    F: Fn(&PassOutcome<'_>) -> Result<()>,
{
    pub fn new(name: impl Into<String>, callback: F) -> Self {
        Self {
            name: name.into(),
            callback,
        }
    }
}

impl<F> SyncObserver for FnObserver<F>
where
    F: Fn(&PassOutcome<'_>) -> Result<()>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn observe(&self, outcome: &PassOutcome<'_>) -> Result<()> {
        (self.callback)(outcome)
    }
}

/// Ordered list of observers.
///
/// Observers run in registration order. A failing observer is logged and
/// never affects the pass or the observers after it.
#[derive(Default)]
pub struct Notifier {
    observers: Vec<Box<dyn SyncObserver>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Webhook observers enabled in the settings.
    pub fn from_config(config: &ProjectConfig) -> Self {
        let mut notifier = Self::new();
        let settings = &config.settings.notifications;
        let hooks = [
            (
                WebhookKind::Slack,
                settings.enable_slack,
                config.secrets.slack_webhook_url.as_deref(),
            ),
            (
                WebhookKind::Discord,
                settings.enable_discord,
                config.secrets.discord_webhook_url.as_deref(),
            ),
        ];

        for (kind, enabled, url) in hooks {
            if !enabled {
                continue;
            }
            let Some(url) = url else {
                tracing::warn!(webhook = %kind, "notifications enabled but no webhook URL is set");
                continue;
            };
            match WebhookObserver::new(
                kind,
                url,
                settings.notify_on_success,
                settings.notify_on_error,
            ) {
                Ok(observer) => notifier.push(Box::new(observer)),
                Err(err) => tracing::warn!(webhook = %kind, error = %err, "webhook disabled"),
            }
        }
        notifier
    }

    pub fn push(&mut self, observer: Box<dyn SyncObserver>) {
        self.observers.push(observer);
    }

    pub fn with(mut self, observer: impl SyncObserver + 'static) -> Self {
        self.push(Box::new(observer));
        self
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.observers.iter().map(|o| o.name()).collect()
    }

    /// Deliver an outcome to every observer.
    pub fn notify(&self, outcome: &PassOutcome<'_>) {
        for observer in &self.observers {
            if let Err(err) = observer.observe(outcome) {
                tracing::warn!(observer = observer.name(), error = %err, "observer failed");
            }
        }
    }
}
