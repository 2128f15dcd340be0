//! Subscriber-authored notification conditions.
//!
//! The wire shape mirrors the payload the authoring UI encodes into the
//! `watch` command: camelCase fields, `{operator, values}` filter groups.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How the values inside one filter dimension combine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum FilterOp {
    And,
    #[default]
    Or,
}

/// One filter dimension. An empty `values` list means "no constraint".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct FilterGroup {
    #[serde(rename = "operator", default)]
    pub op: FilterOp,
    #[serde(default)]
    pub values: Vec<String>,
}

impl FilterGroup {
    pub fn or(values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self { op: FilterOp::Or, values: values.into_iter().map(Into::into).collect() }
    }

    pub fn and(values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self { op: FilterOp::And, values: values.into_iter().map(Into::into).collect() }
    }

    /// Evaluate this group against a single-valued attribute.
    ///
    /// `Or` asks for membership; `And` requires every listed value to be
    /// present in the (one-element) attribute set, so it only passes when all
    /// values equal the attribute.
    pub fn passes_one(&self, value: &str) -> bool {
        if self.values.is_empty() {
            return true;
        }
        match self.op {
            FilterOp::Or => self.values.iter().any(|v| v == value),
            FilterOp::And => self.values.iter().all(|v| v == value),
        }
    }

    /// Evaluate this group against a multi-valued attribute.
    ///
    /// `Or` passes on any shared element; `And` requires the attribute set to
    /// be a superset of `values`.
    pub fn passes_many(&self, attribute: &[&str]) -> bool {
        if self.values.is_empty() {
            return true;
        }
        match self.op {
            FilterOp::Or => self.values.iter().any(|v| attribute.contains(&v.as_str())),
            FilterOp::And => self.values.iter().all(|v| attribute.contains(&v.as_str())),
        }
    }
}

/// Parallel filter set applying only to event-kind entries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct EventFilter {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub event_types: FilterGroup,
    #[serde(default)]
    pub event_stages: FilterGroup,
}

/// One subscriber-authored rule: filters plus a lead time.
///
/// `last_notified` is the only field the engine itself mutates, once per
/// successful delivery.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationCondition {
    /// Stable id, unique within a subscriber. Assigned on save when the
    /// authoring payload carries none.
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub rules: FilterGroup,
    #[serde(default)]
    pub match_types: FilterGroup,
    #[serde(default)]
    pub stages: FilterGroup,
    /// When absent or disabled, event entries never match this condition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_matches: Option<EventFilter>,
    pub notify_minutes_before: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_notified: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

impl NotificationCondition {
    pub fn new(name: impl Into<String>, notify_minutes_before: u32) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            enabled: true,
            rules: FilterGroup::default(),
            match_types: FilterGroup::default(),
            stages: FilterGroup::default(),
            event_matches: None,
            notify_minutes_before,
            last_notified: None,
        }
    }

    /// Assign an id if the authoring payload omitted one.
    pub fn ensure_id(&mut self) {
        if self.id.is_empty() {
            self.id = uuid::Uuid::new_v4().to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_group_always_passes() {
        let group = FilterGroup::default();
        assert!(group.passes_one("anything"));
        assert!(group.passes_many(&["a", "b"]));
    }

    #[test]
    fn test_or_is_membership() {
        let group = FilterGroup::or(["Clam Blitz", "Rainmaker"]);
        assert!(group.passes_one("Rainmaker"));
        assert!(!group.passes_one("Tower Control"));
    }

    #[test]
    fn test_or_many_is_intersection() {
        let group = FilterGroup::or(["s1", "s3"]);
        assert!(group.passes_many(&["s3", "s9"]));
        assert!(!group.passes_many(&["s2", "s9"]));
    }

    #[test]
    fn test_and_many_is_superset() {
        let group = FilterGroup::and(["s1", "s2"]);
        assert!(group.passes_many(&["s2", "s1", "s5"]));
        assert!(!group.passes_many(&["s1", "s5"]));
    }

    #[test]
    fn test_and_one_degenerates_to_single_match() {
        let single = FilterGroup::and(["Rainmaker"]);
        assert!(single.passes_one("Rainmaker"));
        assert!(!single.passes_one("Tower Control"));

        // Two distinct required values can never both equal one attribute.
        let double = FilterGroup::and(["Rainmaker", "Tower Control"]);
        assert!(!double.passes_one("Rainmaker"));
    }

    #[test]
    fn test_condition_wire_shape() {
        let json = r#"{
            "name": "evening anarchy",
            "enabled": true,
            "rules": {"operator": "OR", "values": ["Splat Zones"]},
            "matchTypes": {"operator": "OR", "values": ["Anarchy Battle (Open)"]},
            "stages": {"operator": "AND", "values": []},
            "notifyMinutesBefore": 15
        }"#;
        let cond: NotificationCondition = serde_json::from_str(json).unwrap();
        assert_eq!(cond.name, "evening anarchy");
        assert_eq!(cond.notify_minutes_before, 15);
        assert_eq!(cond.rules.op, FilterOp::Or);
        assert!(cond.event_matches.is_none());
        assert!(cond.last_notified.is_none());
    }

    #[test]
    fn test_ensure_id_assigns_once() {
        let mut cond = NotificationCondition::new("c", 10);
        cond.id.clear();
        cond.ensure_id();
        let first = cond.id.clone();
        assert!(!first.is_empty());
        cond.ensure_id();
        assert_eq!(cond.id, first);
    }
}
