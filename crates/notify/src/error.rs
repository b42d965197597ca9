//! Error types for the notification system.

use thiserror::Error;

/// Errors that can occur when sending notifications.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised while resolving notifier configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The webhook destination is missing or empty
    #[error("The slack callback plugin requires `SLACK_WEBHOOK_URL` to be defined in the environment")]
    MissingWebhookUrl,
}
