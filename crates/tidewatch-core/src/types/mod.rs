//! Shared data model: schedule entries, filter conditions, subscribers.

pub mod condition;
pub mod notify;
pub mod schedule;
pub mod subscriber;

pub use condition::{EventFilter, FilterGroup, FilterOp, NotificationCondition};
pub use notify::NotificationMessage;
pub use schedule::{EntryKind, EventInfo, RuleRef, ScheduleEntry, StageRef};
pub use subscriber::Subscriber;
