//! Flattens the categorized raw feed into one uniform entry sequence.

use chrono::{DateTime, Utc};
use tidewatch_core::types::{EntryKind, ScheduleEntry};

use crate::client::{RawEntry, RawSchedule};

/// Pure and deterministic: identical input yields identical output, in
/// category order (regular, bankara challenge, bankara open, x, event).
/// Records with unparsable or inverted times are dropped with a warning,
/// never turned into errors.
pub fn normalize(raw: &RawSchedule) -> Vec<ScheduleEntry> {
    let result = &raw.data.result;
    let mut entries = Vec::new();

    for (kind, records) in [
        (EntryKind::Regular, &result.regular),
        (EntryKind::BankaraChallenge, &result.bankara_challenge),
        (EntryKind::BankaraOpen, &result.bankara_open),
        (EntryKind::XMatch, &result.x),
    ] {
        for record in records {
            if let Some(entry) = convert(kind, record, None) {
                entries.push(entry);
            }
        }
    }

    for record in &result.event {
        if let Some(entry) = convert(EntryKind::Event, &record.base, Some(record.event.clone())) {
            entries.push(entry);
        }
    }

    entries
}

fn convert(
    kind: EntryKind,
    record: &RawEntry,
    event: Option<tidewatch_core::types::EventInfo>,
) -> Option<ScheduleEntry> {
    let start_time = parse_instant(&record.start_time)?;
    let end_time = parse_instant(&record.end_time)?;
    if start_time >= end_time {
        tracing::warn!(
            %kind,
            start = %record.start_time,
            end = %record.end_time,
            "dropping entry with inverted time range"
        );
        return None;
    }
    Some(ScheduleEntry {
        kind,
        start_time,
        end_time,
        rule: record.rule.clone(),
        stages: record.stages.clone(),
        event,
    })
}

fn parse_instant(value: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(value) {
        Ok(dt) => Some(dt.with_timezone(&Utc)),
        Err(e) => {
            tracing::warn!(value, error = %e, "dropping entry with unparsable timestamp");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::RawSchedule;

    fn sample_feed() -> RawSchedule {
        serde_json::from_str(
            r#"{
            "lastUpdated": "2026-08-01T00:00:00Z",
            "data": {"result": {
                "regular": [{
                    "start_time": "2026-08-01T10:00:00Z",
                    "end_time": "2026-08-01T12:00:00Z",
                    "rule": {"id": "turf", "name": "Turf War"},
                    "stages": [{"id": "s1", "name": "Scorch Gorge"}]
                }],
                "x": [{
                    "start_time": "2026-08-01T10:00:00Z",
                    "end_time": "2026-08-01T12:00:00Z",
                    "rule": {"id": "area", "name": "Splat Zones"},
                    "stages": [{"id": "s2", "name": "Eeltail Alley"}]
                }],
                "event": [{
                    "start_time": "2026-08-01T14:00:00Z",
                    "end_time": "2026-08-01T16:00:00Z",
                    "rule": {"id": "area", "name": "Splat Zones"},
                    "stages": [{"id": "s3", "name": "Hagglefish Market"}],
                    "event": {"id": "e1", "name": "Monthly Challenge", "desc": ""}
                }]
            }}
        }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_flattens_with_kind_tags() {
        let entries = normalize(&sample_feed());
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].kind, EntryKind::Regular);
        assert_eq!(entries[1].kind, EntryKind::XMatch);
        assert_eq!(entries[2].kind, EntryKind::Event);
        assert!(entries[2].event.is_some());
        assert!(entries[0].event.is_none());
    }

    #[test]
    fn test_deterministic_for_identical_input() {
        let feed = sample_feed();
        assert_eq!(normalize(&feed), normalize(&feed));
    }

    #[test]
    fn test_bad_records_dropped_not_fatal() {
        let feed: RawSchedule = serde_json::from_str(
            r#"{"data": {"result": {"regular": [
                {
                    "start_time": "not-a-date",
                    "end_time": "2026-08-01T12:00:00Z",
                    "rule": {"id": "turf", "name": "Turf War"},
                    "stages": []
                },
                {
                    "start_time": "2026-08-01T12:00:00Z",
                    "end_time": "2026-08-01T10:00:00Z",
                    "rule": {"id": "turf", "name": "Turf War"},
                    "stages": []
                }
            ]}}}"#,
        )
        .unwrap();
        assert!(normalize(&feed).is_empty());
    }
}
