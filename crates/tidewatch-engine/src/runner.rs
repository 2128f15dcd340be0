//! Periodic driver for the check orchestrator.

use std::sync::Arc;
use std::time::Duration;

use crate::checker::CheckRunner;

/// Spawn the periodic check loop. Returns the task handle; aborting it stops
/// the loop. The first tick fires after one full interval, not immediately.
///
/// Overlap protection lives in `CheckRunner`, so an on-demand trigger (the
/// gateway's `check` command) can share the same entry point safely.
pub fn spawn_periodic(
    runner: Arc<CheckRunner>,
    interval_minutes: u64,
) -> tokio::task::JoinHandle<()> {
    let period = Duration::from_secs(interval_minutes.max(1) * 60);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        // Consume the immediate first tick.
        ticker.tick().await;
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        tracing::info!(interval_minutes, "periodic check loop started");
        loop {
            ticker.tick().await;
            let report = runner.run_cycle().await;
            if report.dropped {
                continue;
            }
            tracing::debug!(
                sent = report.sent,
                errors = report.errors,
                "periodic check tick complete"
            );
        }
    })
}
