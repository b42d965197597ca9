//! Notifier configuration sourced from the process environment.

use tracing::debug;

use crate::error::ConfigError;

/// Environment variable for the Slack webhook URL.
pub const ENV_SLACK_WEBHOOK_URL: &str = "SLACK_WEBHOOK_URL";

/// Environment variable for the optional channel override.
pub const ENV_SLACK_CHANNEL: &str = "SLACK_CHANNEL";

/// Destination settings, resolved once at setup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifierConfig {
    /// Incoming webhook every message is posted to.
    pub webhook_url: String,
    /// Channel override. `None` leaves routing to the webhook's default.
    pub channel: Option<String>,
}

impl NotifierConfig {
    /// Create a config with an explicit webhook URL and no channel override.
    #[must_use]
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self {
            webhook_url: webhook_url.into(),
            channel: None,
        }
    }

    /// Set the channel override.
    #[must_use]
    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    /// Read `SLACK_WEBHOOK_URL` and `SLACK_CHANNEL` from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration through an arbitrary key lookup.
    ///
    /// Empty values are treated the same as missing ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let webhook_url = non_empty(ENV_SLACK_WEBHOOK_URL).ok_or(ConfigError::MissingWebhookUrl)?;
        let channel = non_empty(ENV_SLACK_CHANNEL);

        match &channel {
            Some(channel) => debug!(channel = %channel, "Slack channel override configured"),
            None => debug!("SLACK_CHANNEL not set, using webhook default channel"),
        }

        Ok(Self {
            webhook_url,
            channel,
        })
    }
}
