//! Notification timing: the in-window check and duplicate suppression.

use chrono::{DateTime, Duration, Utc};
use tidewatch_core::types::{NotificationCondition, ScheduleEntry};

/// Upper bound on entries notified per condition per cycle. Several stages
/// can rotate in simultaneously; anything beyond the cap is reconsidered
/// next cycle while still in-window.
pub const MAX_NOTIFICATIONS_PER_CONDITION: usize = 3;

/// Minimum minutes between two notifications for the same condition,
/// whatever the lead time. Guarantees a single alert per lead-time cycle
/// even for very short leads.
pub const DEDUP_FLOOR_MINUTES: i64 = 60;

/// The instant at which this entry becomes notification-worthy under the
/// given lead time.
pub fn notify_at(entry: &ScheduleEntry, lead_minutes: u32) -> DateTime<Utc> {
    entry.start_time - Duration::minutes(i64::from(lead_minutes))
}

/// Half-open interval check: `notify_at <= now < end_time`.
///
/// Deliberately an interval rather than a point-in-time comparison, so a
/// coarse check interval cannot step over the exact instant. Monotonic in
/// `now` up to the entry's end.
pub fn is_in_notification_window(
    entry: &ScheduleEntry,
    lead_minutes: u32,
    now: DateTime<Utc>,
) -> bool {
    notify_at(entry, lead_minutes) <= now && now < entry.end_time
}

/// May this condition fire again at `now`?
///
/// Eligible when never notified, or when at least
/// `max(lead, DEDUP_FLOOR_MINUTES)` minutes have passed since the last
/// successful notification.
pub fn is_eligible(condition: &NotificationCondition, now: DateTime<Utc>) -> bool {
    let Some(last) = condition.last_notified else {
        return true;
    };
    let window = Duration::minutes(
        i64::from(condition.notify_minutes_before).max(DEDUP_FLOOR_MINUTES),
    );
    now - last >= window
}

/// In-window and not a duplicate.
pub fn should_notify(
    entry: &ScheduleEntry,
    condition: &NotificationCondition,
    now: DateTime<Utc>,
) -> bool {
    is_in_notification_window(entry, condition.notify_minutes_before, now)
        && is_eligible(condition, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidewatch_core::types::{EntryKind, RuleRef, ScheduleEntry};

    fn entry_starting_in(now: DateTime<Utc>, minutes: i64) -> ScheduleEntry {
        let start = now + Duration::minutes(minutes);
        ScheduleEntry {
            kind: EntryKind::Regular,
            start_time: start,
            end_time: start + Duration::hours(2),
            rule: RuleRef { id: "turf".into(), name: "Turf War".into() },
            stages: vec![],
            event: None,
        }
    }

    #[test]
    fn test_window_opens_at_lead_time() {
        let now = Utc::now();
        let entry = entry_starting_in(now, 10);

        assert!(is_in_notification_window(&entry, 10, now));
        // One minute before the lead time arrives: not yet.
        assert!(!is_in_notification_window(&entry, 10, now - Duration::minutes(1)));
        // A longer lead opens the window earlier.
        assert!(is_in_notification_window(&entry, 30, now));
    }

    #[test]
    fn test_window_is_half_open_at_end() {
        let now = Utc::now();
        let entry = entry_starting_in(now, 10);

        // Still in-window while the entry runs...
        assert!(is_in_notification_window(&entry, 10, entry.start_time + Duration::minutes(30)));
        // ...closed exactly at end_time.
        assert!(!is_in_notification_window(&entry, 10, entry.end_time));
        assert!(!is_in_notification_window(&entry, 10, entry.end_time + Duration::seconds(1)));
    }

    #[test]
    fn test_window_is_monotonic_in_now() {
        let now = Utc::now();
        let entry = entry_starting_in(now, 10);
        let open_at = notify_at(&entry, 10);

        let mut t = open_at;
        let mut was_open = false;
        while t < entry.end_time + Duration::minutes(5) {
            let open = is_in_notification_window(&entry, 10, t);
            if was_open && t < entry.end_time {
                assert!(open, "window closed before end_time at {t}");
            }
            was_open = open;
            t += Duration::minutes(7);
        }
    }

    #[test]
    fn test_scenario_a_fresh_condition_fires() {
        let now = Utc::now();
        let entry = entry_starting_in(now, 10);
        let cond = NotificationCondition::new("a", 10);
        assert!(should_notify(&entry, &cond, now));
    }

    #[test]
    fn test_scenario_b_recent_notification_suppressed() {
        let now = Utc::now();
        let entry = entry_starting_in(now, 10);
        let mut cond = NotificationCondition::new("b", 10);
        cond.last_notified = Some(now - Duration::minutes(5));
        // Inside the one-hour floor even though the lead time is only 10.
        assert!(!should_notify(&entry, &cond, now));
    }

    #[test]
    fn test_dedup_floor_is_max_of_lead_and_hour() {
        let now = Utc::now();
        let mut cond = NotificationCondition::new("c", 10);

        cond.last_notified = Some(now - Duration::minutes(59));
        assert!(!is_eligible(&cond, now));
        cond.last_notified = Some(now - Duration::minutes(60));
        assert!(is_eligible(&cond, now));

        // A 90-minute lead stretches the floor past one hour.
        cond.notify_minutes_before = 90;
        cond.last_notified = Some(now - Duration::minutes(75));
        assert!(!is_eligible(&cond, now));
        cond.last_notified = Some(now - Duration::minutes(90));
        assert!(is_eligible(&cond, now));
    }

    #[test]
    fn test_unset_last_notified_always_eligible() {
        let cond = NotificationCondition::new("d", 0);
        assert!(is_eligible(&cond, Utc::now()));
    }
}
