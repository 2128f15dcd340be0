//! The check orchestrator: one pass over every subscriber against the
//! current schedule snapshot.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};

use tidewatch_core::traits::{DeliveryChannel, ScheduleSource, SubscriptionStore};
use tidewatch_core::types::{NotificationMessage, ScheduleEntry, Subscriber};

use crate::matcher;
use crate::timing::{self, MAX_NOTIFICATIONS_PER_CONDITION};

/// Aggregate outcome of one check cycle.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// True when the trigger was dropped by the re-entrancy guard.
    pub dropped: bool,
    pub subscribers: usize,
    pub sent: usize,
    pub errors: usize,
}

impl CycleReport {
    fn dropped() -> Self {
        Self { dropped: true, ..Default::default() }
    }
}

/// Drives the pipeline: takes a schedule snapshot, then evaluates, gates,
/// sends, and records for each subscriber in turn. All collaborators are
/// injected; the runner holds no state beyond the re-entrancy flag.
pub struct CheckRunner {
    source: Arc<dyn ScheduleSource>,
    store: Arc<dyn SubscriptionStore>,
    channel: Arc<dyn DeliveryChannel>,
    running: AtomicBool,
}

impl CheckRunner {
    pub fn new(
        source: Arc<dyn ScheduleSource>,
        store: Arc<dyn SubscriptionStore>,
        channel: Arc<dyn DeliveryChannel>,
    ) -> Self {
        Self { source, store, channel, running: AtomicBool::new(false) }
    }

    /// Run one check cycle at the current wall-clock time.
    pub async fn run_cycle(&self) -> CycleReport {
        self.run_cycle_at(Utc::now()).await
    }

    /// Run one check cycle against an explicit `now`.
    ///
    /// At most one cycle runs at a time within this process; an overlapping
    /// trigger is dropped, not queued. Cross-process safety is the store's
    /// job via atomic per-record writes.
    pub async fn run_cycle_at(&self, now: DateTime<Utc>) -> CycleReport {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::warn!("check cycle already in progress, dropping trigger");
            return CycleReport::dropped();
        }

        let report = self.cycle(now).await;
        self.running.store(false, Ordering::SeqCst);

        tracing::info!(
            subscribers = report.subscribers,
            sent = report.sent,
            errors = report.errors,
            "check cycle finished"
        );
        report
    }

    async fn cycle(&self, now: DateTime<Utc>) -> CycleReport {
        let mut report = CycleReport::default();

        // Feed failure is cycle-level: nobody gets evaluated against a
        // missing feed, and the error is counted exactly once.
        let entries = match self.source.entries(now).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::error!(error = %e, "schedule feed unavailable, skipping check cycle");
                report.errors += 1;
                return report;
            }
        };

        let subscribers = match self.store.load_all().await {
            Ok(subscribers) => subscribers,
            Err(e) => {
                tracing::error!(error = %e, "failed to load subscribers, skipping check cycle");
                report.errors += 1;
                return report;
            }
        };

        report.subscribers = subscribers.len();
        tracing::debug!(
            subscribers = subscribers.len(),
            entries = entries.len(),
            "starting per-subscriber loop"
        );

        // Sequential by design: bounds the outbound message rate.
        for subscriber in &subscribers {
            self.check_subscriber(subscriber, &entries, now, &mut report).await;
        }

        report
    }

    async fn check_subscriber(
        &self,
        subscriber: &Subscriber,
        entries: &[ScheduleEntry],
        now: DateTime<Utc>,
        report: &mut CycleReport,
    ) {
        for condition in subscriber.conditions.iter().filter(|c| c.enabled) {
            if !timing::is_eligible(condition, now) {
                continue;
            }

            let candidates: Vec<&ScheduleEntry> = entries
                .iter()
                .filter(|e| {
                    timing::is_in_notification_window(e, condition.notify_minutes_before, now)
                })
                .filter(|e| matcher::matches(e, condition))
                .collect();

            for entry in candidates.into_iter().take(MAX_NOTIFICATIONS_PER_CONDITION) {
                let message = NotificationMessage::new(condition, entry);
                match self
                    .channel
                    .send_notification(&subscriber.destination_id, &message)
                    .await
                {
                    Ok(true) => {
                        report.sent += 1;
                        match self
                            .store
                            .record_notified(&subscriber.subscriber_id, &condition.id, now)
                            .await
                        {
                            Ok(true) => {}
                            Ok(false) => tracing::warn!(
                                subscriber = %subscriber.subscriber_id,
                                condition = %condition.name,
                                "record_notified missed: record changed under us"
                            ),
                            Err(e) => {
                                report.errors += 1;
                                tracing::error!(
                                    subscriber = %subscriber.subscriber_id,
                                    condition = %condition.name,
                                    error = %e,
                                    "failed to record notification"
                                );
                            }
                        }
                    }
                    // Not recorded as sent: retried next cycle while in-window.
                    Ok(false) => {
                        report.errors += 1;
                        tracing::warn!(
                            subscriber = %subscriber.subscriber_id,
                            condition = %condition.name,
                            "delivery failed"
                        );
                    }
                    Err(e) => {
                        report.errors += 1;
                        tracing::warn!(
                            subscriber = %subscriber.subscriber_id,
                            condition = %condition.name,
                            error = %e,
                            "delivery error"
                        );
                    }
                }
            }
        }
    }
}
