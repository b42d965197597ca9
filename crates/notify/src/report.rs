//! Console report of final run statistics.

use std::fmt::Write;

use crate::events::RunStats;

/// Render the per-host statistics table.
///
/// One header line followed by one row per processed host, in host order.
#[must_use]
pub fn render_stats_table(stats: &RunStats) -> String {
    let mut out = format!(
        "{:<8} {:<15} {:<10} {:<8} {:<8}\n",
        "Host", "Ok", "Changed", "Unreachable", "Failures"
    );

    for (host, s) in &stats.processed {
        // Writing to a String is infallible.
        let _ = writeln!(
            out,
            "{:<8} {:<15} {:<10} {:<8} {:<8}",
            host, s.ok, s.changed, s.unreachable, s.failures
        );
    }

    out
}
