//! # Tidewatch Core
//! Shared types, trait seams, errors, and configuration for Tidewatch.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::TidewatchConfig;
pub use error::{Result, TidewatchError};
