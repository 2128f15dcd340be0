//! Trait seams between the engine and its collaborators.
//!
//! Everything the check orchestrator talks to is injected behind one of
//! these object-safe traits, so tests can substitute in-memory fakes without
//! touching global state.

pub mod channel;
pub mod source;
pub mod store;

pub use channel::DeliveryChannel;
pub use source::ScheduleSource;
pub use store::SubscriptionStore;
