//! Slack incoming-webhook payloads and transport.

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::error::ChannelError;
use crate::events::TaskResult;
use crate::Transport;

/// Display name every message is posted under.
pub const USERNAME: &str = "Ansible";

/// Attachment colour for task failures.
pub const FAILURE_COLOR: &str = "#FF0000";

/// Slack incoming-webhook transport.
pub struct SlackWebhook {
    webhook_url: String,
    client: reqwest::Client,
}

impl SlackWebhook {
    /// Create a transport posting to `webhook_url`.
    #[must_use]
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self::with_client(webhook_url, reqwest::Client::new())
    }

    /// Create a transport sharing an existing HTTP client.
    #[must_use]
    pub fn with_client(webhook_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            webhook_url: webhook_url.into(),
            client,
        }
    }

    #[must_use]
    pub fn webhook_url(&self) -> &str {
        &self.webhook_url
    }
}

#[async_trait]
impl Transport for SlackWebhook {
    fn name(&self) -> &'static str {
        "slack"
    }

    async fn post(&self, payload: &SlackPayload) -> Result<(), ChannelError> {
        let body = serde_json::to_vec(payload)?;

        debug!(channel = "slack", bytes = body.len(), "Posting to webhook");

        let response = self
            .client
            .post(&self.webhook_url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        // Fire and forget: the status is recorded, never acted on.
        debug!(channel = "slack", status = %response.status(), "Webhook responded");
        Ok(())
    }
}

// =============================================================================
// Slack API types
// =============================================================================

/// Body of one webhook request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlackPayload {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<SlackAttachment>,
}

/// Styled block inside a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlackAttachment {
    pub title: String,
    pub color: String,
    pub text: String,
}

impl SlackPayload {
    /// Plain-text message.
    #[must_use]
    pub fn text(msg: impl Into<String>, channel: Option<&str>) -> Self {
        Self {
            username: USERNAME.to_string(),
            channel: channel.map(str::to_string),
            text: Some(msg.into()),
            attachments: vec![],
        }
    }

    /// Failure report for one task result.
    ///
    /// Used for both failed tasks and unreachable hosts.
    #[must_use]
    pub fn task_failure(result: &TaskResult, channel: Option<&str>) -> Self {
        let attachment = SlackAttachment {
            title: format!("Ansible run has failed. HOST: {} {}", result.host, result.task),
            color: FAILURE_COLOR.to_string(),
            text: format!("```{}```", pretty_json(&result.result)),
        };

        Self {
            username: USERNAME.to_string(),
            channel: channel.map(str::to_string),
            text: None,
            attachments: vec![attachment],
        }
    }
}

/// Render a value as JSON indented by two spaces.
fn pretty_json(value: &serde_json::Value) -> String {
    // Serializing a `Value` cannot fail; fall back to compact form regardless.
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
