//! Callback event types emitted by the orchestrator during a run.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Run-level variable carrying the job template name.
pub const TEMPLATE_NAME_VAR: &str = "tower_job_template_name";

/// Overall colour of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusColor {
    /// Every host succeeded
    Green,
    /// At least one host failed or was unreachable
    Red,
}

impl StatusColor {
    /// Get display name for this colour.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Red => "red",
        }
    }
}

/// Arguments of the play-start callback.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayStart {
    /// Run-level variables.
    #[serde(default)]
    pub vars: Map<String, Value>,
    /// Source file the play was loaded from.
    pub playbook_path: String,
    /// Inventory source the play targets.
    #[serde(default)]
    pub inventory_path: Option<String>,
    /// Host subset limit, if one was given.
    #[serde(default)]
    pub subset: Option<String>,
    #[serde(default)]
    pub skip_tags: Vec<String>,
}

impl PlayStart {
    /// Template name from the run variables, when present as a string.
    #[must_use]
    pub fn template_name(&self) -> Option<&str> {
        self.vars.get(TEMPLATE_NAME_VAR).and_then(Value::as_str)
    }
}

/// One finished task attempt on one host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    pub host: String,
    pub task: String,
    /// Structured module result, reported verbatim.
    #[serde(default)]
    pub result: Value,
}

/// Per-host counters from the final run statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostStats {
    pub ok: u32,
    pub changed: u32,
    pub unreachable: u32,
    pub failures: u32,
    pub skipped: u32,
    pub rescued: u32,
    pub ignored: u32,
}

/// Final statistics for every processed host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    #[serde(default)]
    pub processed: BTreeMap<String, HostStats>,
}

impl RunStats {
    /// Summarise the run across all processed hosts.
    #[must_use]
    pub fn outcome(&self) -> RunOutcome {
        self.processed
            .values()
            .fold(RunOutcome::default(), |acc, stats| RunOutcome {
                has_failures: acc.has_failures || stats.failures > 0,
                has_unreachable: acc.has_unreachable || stats.unreachable > 0,
            })
    }
}

/// Whether a run saw any failed or unreachable host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOutcome {
    pub has_failures: bool,
    pub has_unreachable: bool,
}

impl RunOutcome {
    /// True when any host failed or was unreachable.
    #[must_use]
    pub const fn failed(&self) -> bool {
        self.has_failures || self.has_unreachable
    }

    #[must_use]
    pub const fn color(&self) -> StatusColor {
        if self.failed() {
            StatusColor::Red
        } else {
            StatusColor::Green
        }
    }
}

/// Lifecycle callbacks the notifier reacts to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CallbackEvent {
    /// A play is starting
    PlayStart(PlayStart),

    /// A task failed on a host
    TaskFailed {
        result: TaskResult,
        #[serde(default)]
        ignore_errors: bool,
    },

    /// A host could not be reached
    HostUnreachable { result: TaskResult },

    /// The run finished; fired once
    Stats(RunStats),
}

impl CallbackEvent {
    /// Short name for logging.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::PlayStart(_) => "play_start",
            Self::TaskFailed { .. } => "task_failed",
            Self::HostUnreachable { .. } => "host_unreachable",
            Self::Stats(_) => "stats",
        }
    }
}
