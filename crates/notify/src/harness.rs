//! Process-level setup for embedding the notifier.

use crate::{ConfigError, Notifier};

/// Build a [`Notifier`] from the environment, or exit the process.
///
/// A missing webhook leaves nothing to deliver to, so the host process is
/// stopped with status 1 before any event is handled.
#[must_use]
pub fn setup_or_exit() -> Notifier {
    match Notifier::from_env() {
        Ok(notifier) => notifier,
        Err(e) => exit_with(&e),
    }
}

fn exit_with(e: &ConfigError) -> ! {
    eprintln!("Error: {e}");
    std::process::exit(1);
}
