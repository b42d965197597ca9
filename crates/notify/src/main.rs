//! Replays orchestrator callbacks from newline-delimited JSON into the notifier.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use playbook_notify::{harness, CallbackEvent};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{info, warn};

/// Send playbook run outcomes to a Slack webhook.
#[derive(Debug, Parser)]
#[command(name = "playbook-notify", version, about)]
struct Args {
    /// File of newline-delimited callback events (defaults to stdin)
    #[arg(long, env = "PLAYBOOK_NOTIFY_EVENTS")]
    events: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut notifier = harness::setup_or_exit();

    let handled = match &args.events {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("failed to open {}", path.display()))?;
            replay(BufReader::new(file), &mut notifier).await?
        }
        None => replay(BufReader::new(tokio::io::stdin()), &mut notifier).await?,
    };

    info!(events = handled, "Event stream finished");
    Ok(())
}

/// Feed each line to the notifier in order. Malformed lines are skipped.
async fn replay<R>(reader: R, notifier: &mut playbook_notify::Notifier) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut handled = 0usize;
    let mut line_no = 0usize;

    while let Some(line) = lines.next_line().await.context("failed to read event stream")? {
        line_no += 1;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<CallbackEvent>(&line) {
            Ok(event) => {
                notifier.handle(event).await;
                handled += 1;
            }
            Err(e) => {
                warn!(line = line_no, error = %e, "Skipping malformed event");
            }
        }
    }

    Ok(handled)
}
