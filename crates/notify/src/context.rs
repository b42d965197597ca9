//! Per-run state accumulated across callbacks.

use std::path::Path;

use crate::events::PlayStart;

/// Fallback shown when a run never reported a usable name.
pub const UNKNOWN_NAME: &str = "unknown playbook";

/// Details captured once, on the first play of a run.
///
/// Nothing here is sent to the webhook. It is kept so callers can report
/// inventory, subset and skipped tags without re-deriving them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybookBanner {
    pub playbook_name: String,
    pub inventory_name: Option<String>,
    pub subset: Option<String>,
    pub skip_tags: Vec<String>,
}

impl PlaybookBanner {
    fn from_play(play: &PlayStart) -> Self {
        Self {
            playbook_name: playbook_name(&play.playbook_path),
            inventory_name: play.inventory_path.as_deref().and_then(inventory_name),
            subset: play.subset.clone(),
            skip_tags: play.skip_tags.clone(),
        }
    }
}

/// Mutable state for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunContext {
    template_name: Option<String>,
    banner: Option<PlaybookBanner>,
}

impl RunContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a play start.
    ///
    /// The template name is refreshed on every play. The banner is derived
    /// only on the first call; returns `true` when this call derived it.
    pub fn record_play(&mut self, play: &PlayStart) -> bool {
        if let Some(template) = play.template_name() {
            self.template_name = Some(template.to_string());
        }

        if self.banner.is_some() {
            return false;
        }

        self.banner = Some(PlaybookBanner::from_play(play));
        true
    }

    #[must_use]
    pub fn template_name(&self) -> Option<&str> {
        self.template_name.as_deref()
    }

    #[must_use]
    pub fn playbook_name(&self) -> Option<&str> {
        self.banner.as_ref().map(|b| b.playbook_name.as_str())
    }

    #[must_use]
    pub fn banner(&self) -> Option<&PlaybookBanner> {
        self.banner.as_ref()
    }

    /// Whether the banner has been derived for this run.
    #[must_use]
    pub const fn banner_printed(&self) -> bool {
        self.banner.is_some()
    }

    /// Name used in the "Playbook complete" message.
    ///
    /// Falls back to the playbook name when no template name was supplied.
    #[must_use]
    pub fn summary_name(&self) -> &str {
        self.template_name()
            .or_else(|| self.playbook_name())
            .unwrap_or(UNKNOWN_NAME)
    }

    /// Name used in the "Failures detected" message.
    #[must_use]
    pub fn failure_name(&self) -> &str {
        self.playbook_name().unwrap_or(UNKNOWN_NAME)
    }
}

/// Strip directory and extension from a playbook path.
#[must_use]
pub fn playbook_name(path: &str) -> String {
    let path = Path::new(path);
    path.file_stem()
        .or_else(|| path.file_name())
        .map_or_else(|| path.to_string_lossy().into_owned(), |s| s.to_string_lossy().into_owned())
}

/// Final component of an inventory source, resolved through symlinks when possible.
fn inventory_name(path: &str) -> Option<String> {
    let path = Path::new(path);
    let resolved = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    resolved
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
}
