//! # Tidewatch Engine
//! The notification core: condition evaluation, timing gate, and the check
//! orchestrator that ties feed, store, and delivery channel together.

pub mod checker;
pub mod matcher;
pub mod runner;
pub mod timing;

pub use checker::{CheckRunner, CycleReport};
pub use runner::spawn_periodic;
