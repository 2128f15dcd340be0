//! Schedule entry types.
//!
//! One `ScheduleEntry` is a single timed rotation slot (or event window) from
//! the upstream feed. Entries are rebuilt on every fetch and never persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category tag for a schedule entry, resolved once by the normalizer.
///
/// Downstream code switches on this tag; nothing probes for the presence of
/// an `event` field.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Regular,
    BankaraChallenge,
    BankaraOpen,
    #[serde(rename = "x")]
    XMatch,
    Event,
}

impl EntryKind {
    /// Display label, also the value subscriber match-type filters are
    /// written against.
    pub fn display_name(&self) -> &'static str {
        match self {
            EntryKind::Regular => "Regular Battle",
            EntryKind::BankaraChallenge => "Anarchy Battle (Series)",
            EntryKind::BankaraOpen => "Anarchy Battle (Open)",
            EntryKind::XMatch => "X Battle",
            EntryKind::Event => "Challenge Event",
        }
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// A game rule/mode reference.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleRef {
    pub id: String,
    pub name: String,
}

/// A stage (location) reference.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StageRef {
    pub id: String,
    pub name: String,
}

/// Extra payload carried by event-kind entries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub desc: String,
}

/// One timed activity instance. Invariant: `start_time < end_time`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduleEntry {
    pub kind: EntryKind,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub rule: RuleRef,
    pub stages: Vec<StageRef>,
    /// Present iff `kind == EntryKind::Event`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<EventInfo>,
}

impl ScheduleEntry {
    pub fn stage_ids(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.id.as_str()).collect()
    }

    pub fn stage_names(&self) -> String {
        self.stages
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
