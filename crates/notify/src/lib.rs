//! Slack notifications for playbook runs.
//!
//! This crate turns orchestrator lifecycle callbacks into Slack
//! incoming-webhook messages: one message per failed task or unreachable
//! host, and a summary once the run finishes.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use playbook_notify::{Notifier, NotifierConfig, SlackWebhook, TaskResult};
//!
//! # async fn run() -> Result<(), playbook_notify::ConfigError> {
//! let config = NotifierConfig::from_env()?;
//! let transport = Arc::new(SlackWebhook::new(config.webhook_url.clone()));
//! let mut notifier = Notifier::new(config, transport);
//!
//! notifier
//!     .on_task_failed(
//!         &TaskResult {
//!             host: "web1".to_string(),
//!             task: "restart nginx".to_string(),
//!             result: serde_json::json!({"rc": 1}),
//!         },
//!         false,
//!     )
//!     .await;
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! - `SLACK_WEBHOOK_URL`: destination webhook (required)
//! - `SLACK_CHANNEL`: channel override (optional)
//!
//! # Architecture
//!
//! - [`Transport`] is the network seam; [`SlackWebhook`] implements it with reqwest
//! - [`SlackPayload`] builds the two message shapes
//! - [`Notifier`] holds the [`RunContext`] and dispatches callbacks
//!
//! Handlers await delivery before returning, so messages reach the webhook
//! in the order the events occurred. Delivery errors are logged, never
//! returned to the orchestrator.

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod channels;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod harness;
pub mod report;

pub use channels::slack::{SlackAttachment, SlackPayload, SlackWebhook};
pub use channels::Transport;
pub use config::NotifierConfig;
pub use context::{PlaybookBanner, RunContext};
pub use error::{ChannelError, ConfigError};
pub use events::{CallbackEvent, HostStats, PlayStart, RunOutcome, RunStats, StatusColor, TaskResult};

use std::sync::Arc;
use tracing::{debug, error, info};

/// Event-to-message adapter for one run.
pub struct Notifier {
    config: NotifierConfig,
    context: RunContext,
    transport: Arc<dyn Transport>,
}

impl Notifier {
    /// Create a notifier posting through `transport`.
    #[must_use]
    pub fn new(config: NotifierConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config,
            context: RunContext::new(),
            transport,
        }
    }

    /// Create a notifier from the environment with the Slack webhook transport.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = NotifierConfig::from_env()?;
        let transport = Arc::new(SlackWebhook::new(config.webhook_url.clone()));
        info!(transport = transport.name(), "Notifier initialized");
        Ok(Self::new(config, transport))
    }

    #[must_use]
    pub fn config(&self) -> &NotifierConfig {
        &self.config
    }

    #[must_use]
    pub fn context(&self) -> &RunContext {
        &self.context
    }

    /// Dispatch one callback to its handler.
    pub async fn handle(&mut self, event: CallbackEvent) {
        debug!(event = event.kind(), "Handling callback");

        match event {
            CallbackEvent::PlayStart(play) => self.on_play_start(&play),
            CallbackEvent::TaskFailed {
                result,
                ignore_errors,
            } => self.on_task_failed(&result, ignore_errors).await,
            CallbackEvent::HostUnreachable { result } => self.on_host_unreachable(&result).await,
            CallbackEvent::Stats(stats) => self.on_stats(&stats).await,
        }
    }

    /// A play is starting.
    ///
    /// Picks up the template name and, on the first play only, the banner.
    pub fn on_play_start(&mut self, play: &PlayStart) {
        if !self.context.record_play(play) {
            debug!("Banner already recorded for this run");
            return;
        }

        if let Some(banner) = self.context.banner() {
            debug!(
                playbook = %banner.playbook_name,
                inventory = ?banner.inventory_name,
                subset = ?banner.subset,
                skip_tags = ?banner.skip_tags,
                "Playbook started"
            );
        }
    }

    /// A task failed. `ignore_errors` does not suppress the message.
    pub async fn on_task_failed(&self, result: &TaskResult, ignore_errors: bool) {
        debug!(host = %result.host, task = %result.task, ignore_errors, "Task failed");
        self.notify_failure(result).await;
    }

    /// A host was unreachable.
    pub async fn on_host_unreachable(&self, result: &TaskResult) {
        debug!(host = %result.host, task = %result.task, "Host unreachable");
        self.notify_failure(result).await;
    }

    /// The run finished.
    ///
    /// Prints the statistics table, then sends "Playbook complete" and, if
    /// any host failed or was unreachable, "Failures detected".
    pub async fn on_stats(&self, stats: &RunStats) {
        print!("{}", report::render_stats_table(stats));

        let outcome = stats.outcome();
        info!(
            hosts = stats.processed.len(),
            failures = outcome.has_failures,
            unreachable = outcome.has_unreachable,
            color = outcome.color().as_str(),
            "Run complete"
        );

        self.send_msg(format!("{}: Playbook complete", self.context.summary_name()))
            .await;

        if outcome.failed() {
            self.send_msg(format!("{}: Failures detected", self.context.failure_name()))
                .await;
        }
    }

    async fn notify_failure(&self, result: &TaskResult) {
        let payload = SlackPayload::task_failure(result, self.config.channel.as_deref());
        self.deliver(&payload).await;
    }

    async fn send_msg(&self, msg: String) {
        let payload = SlackPayload::text(msg, self.config.channel.as_deref());
        self.deliver(&payload).await;
    }

    async fn deliver(&self, payload: &SlackPayload) {
        let transport = self.transport.name();

        match self.transport.post(payload).await {
            Ok(()) => {
                debug!(transport, "Notification sent");
            }
            Err(e) => {
                error!(
                    transport,
                    error = %e,
                    "Failed to send notification"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Records every payload instead of posting it.
    #[derive(Default)]
    struct RecordingTransport {
        sent: Mutex<Vec<SlackPayload>>,
    }

    impl RecordingTransport {
        fn sent(&self) -> Vec<SlackPayload> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn post(&self, payload: &SlackPayload) -> Result<(), ChannelError> {
            self.sent.lock().unwrap().push(payload.clone());
            Ok(())
        }
    }

    /// Fails every post with a serialization error.
    struct FailingTransport;

    #[async_trait]
    impl Transport for FailingTransport {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn post(&self, _payload: &SlackPayload) -> Result<(), ChannelError> {
            let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
            Err(ChannelError::Serialization(err))
        }
    }

    fn notifier(channel: Option<&str>) -> (Notifier, Arc<RecordingTransport>) {
        let transport = Arc::new(RecordingTransport::default());
        let mut config = NotifierConfig::new("https://hooks.example/abc");
        config.channel = channel.map(str::to_string);
        (Notifier::new(config, transport.clone()), transport)
    }

    fn task(host: &str) -> TaskResult {
        TaskResult {
            host: host.to_string(),
            task: "install packages".to_string(),
            result: json!({"failed": true, "msg": "No package matching 'ngnix'"}),
        }
    }

    fn play(path: &str, template: Option<&str>) -> PlayStart {
        let mut play = PlayStart {
            playbook_path: path.to_string(),
            ..PlayStart::default()
        };
        if let Some(template) = template {
            play.vars
                .insert(events::TEMPLATE_NAME_VAR.to_string(), json!(template));
        }
        play
    }

    fn stats(pairs: &[(&str, u32, u32)]) -> RunStats {
        let mut run = RunStats::default();
        for (host, failures, unreachable) in pairs {
            run.processed.insert(
                (*host).to_string(),
                HostStats {
                    ok: 1,
                    failures: *failures,
                    unreachable: *unreachable,
                    ..HostStats::default()
                },
            );
        }
        run
    }

    fn texts(sent: &[SlackPayload]) -> Vec<&str> {
        sent.iter().filter_map(|p| p.text.as_deref()).collect()
    }

    #[tokio::test]
    async fn test_failed_and_unreachable_share_message_shape() {
        let (notifier, transport) = notifier(None);

        notifier.on_task_failed(&task("web2"), false).await;
        notifier.on_host_unreachable(&task("web2")).await;

        let sent = transport.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0], sent[1]);
        assert_eq!(
            sent[0].attachments[0].title,
            "Ansible run has failed. HOST: web2 install packages"
        );
    }

    #[tokio::test]
    async fn test_ignore_errors_still_notifies() {
        let (notifier, transport) = notifier(None);
        notifier.on_task_failed(&task("web1"), true).await;
        assert_eq!(transport.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_stats_with_failures_sends_two_messages() {
        let (mut notifier, transport) = notifier(None);
        notifier.on_play_start(&play("/srv/site.yml", Some("Deploy web")));

        notifier
            .on_stats(&stats(&[("web1", 0, 0), ("web2", 1, 0)]))
            .await;

        assert_eq!(
            texts(&transport.sent()),
            vec!["Deploy web: Playbook complete", "site: Failures detected"]
        );
    }

    #[tokio::test]
    async fn test_stats_with_unreachable_host_flags_failure() {
        let (mut notifier, transport) = notifier(None);
        notifier.on_play_start(&play("site.yml", None));

        notifier.on_stats(&stats(&[("db1", 0, 1)])).await;

        assert_eq!(transport.sent().len(), 2);
    }

    #[tokio::test]
    async fn test_clean_run_sends_only_completion() {
        let (mut notifier, transport) = notifier(None);
        notifier.on_play_start(&play("site.yml", Some("Nightly")));

        notifier
            .on_stats(&stats(&[("web1", 0, 0), ("web2", 0, 0)]))
            .await;

        assert_eq!(
            texts(&transport.sent()),
            vec!["Nightly: Playbook complete"]
        );
    }

    #[tokio::test]
    async fn test_channel_applied_to_every_payload() {
        let (mut notifier, transport) = notifier(Some("#deploys"));
        notifier.on_play_start(&play("site.yml", None));

        notifier.on_task_failed(&task("web2"), false).await;
        notifier.on_stats(&stats(&[("web2", 1, 0)])).await;

        let sent = transport.sent();
        assert_eq!(sent.len(), 3);
        assert!(sent
            .iter()
            .all(|p| p.channel.as_deref() == Some("#deploys")));
    }

    #[tokio::test]
    async fn test_no_channel_when_unset() {
        let (notifier, transport) = notifier(None);
        notifier.on_task_failed(&task("web2"), false).await;
        notifier.on_stats(&stats(&[])).await;

        assert!(transport.sent().iter().all(|p| p.channel.is_none()));
    }

    #[tokio::test]
    async fn test_second_play_start_keeps_first_banner() {
        let (mut notifier, transport) = notifier(None);

        notifier.on_play_start(&play("/srv/first.yml", None));
        let banner = notifier.context().banner().cloned();
        notifier.on_play_start(&play("/srv/second.yml", None));

        assert_eq!(notifier.context().banner().cloned(), banner);
        assert_eq!(notifier.context().playbook_name(), Some("first"));
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn test_handle_dispatches_events() {
        let (mut notifier, transport) = notifier(None);

        notifier
            .handle(CallbackEvent::PlayStart(play("site.yml", None)))
            .await;
        notifier
            .handle(CallbackEvent::HostUnreachable { result: task("db1") })
            .await;
        notifier
            .handle(CallbackEvent::Stats(stats(&[("db1", 0, 1)])))
            .await;

        let sent = transport.sent();
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[0].attachments.len(), 1);
        assert_eq!(
            texts(&sent),
            vec!["site: Playbook complete", "site: Failures detected"]
        );
    }

    #[tokio::test]
    async fn test_transport_errors_are_swallowed() {
        let notifier = Notifier::new(
            NotifierConfig::new("https://hooks.example/abc"),
            Arc::new(FailingTransport),
        );

        notifier.on_task_failed(&task("web1"), false).await;
        notifier.on_stats(&stats(&[("web1", 1, 0)])).await;
    }
}
