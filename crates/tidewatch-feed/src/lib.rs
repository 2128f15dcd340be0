//! # Tidewatch Feed
//! Fetching, caching, and normalizing the upstream schedule feed.

pub mod cache;
pub mod client;
pub mod normalize;

pub use cache::SnapshotCache;
pub use client::{RawSchedule, ScheduleClient};
pub use normalize::normalize;
