//! Condition evaluation against normalized schedule entries.

use tidewatch_core::types::{EntryKind, NotificationCondition, ScheduleEntry};

/// Does this entry satisfy the condition's filters?
///
/// Event-kind entries are routed exclusively through the condition's event
/// filter: the base rule/match-type/stage filters never see them, and a
/// missing or disabled event filter excludes them entirely. For ordinary
/// entries, the three base dimensions are AND-ed together; only inside one
/// dimension does that group's own operator apply.
pub fn matches(entry: &ScheduleEntry, condition: &NotificationCondition) -> bool {
    if entry.kind == EntryKind::Event {
        return matches_event(entry, condition);
    }

    condition.rules.passes_one(&entry.rule.name)
        && condition.match_types.passes_one(entry.kind.display_name())
        && condition.stages.passes_many(&entry.stage_ids())
}

fn matches_event(entry: &ScheduleEntry, condition: &NotificationCondition) -> bool {
    let Some(filter) = &condition.event_matches else {
        return false;
    };
    if !filter.enabled {
        return false;
    }
    let Some(event) = &entry.event else {
        // An event-kind entry without an event payload is malformed; the
        // normalizer does not produce these.
        return false;
    };

    filter.event_types.passes_one(&event.name) && filter.event_stages.passes_many(&entry.stage_ids())
}

/// The subset of `entries` satisfying `condition`.
pub fn filter_entries<'a>(
    entries: &'a [ScheduleEntry],
    condition: &NotificationCondition,
) -> Vec<&'a ScheduleEntry> {
    entries.iter().filter(|e| matches(e, condition)).collect()
}
