//! # Tidewatch Store
//! Subscription persistence backends.

pub mod memory;
pub mod retry;
pub mod sqlite;

use std::sync::Arc;

use tidewatch_core::config::StoreConfig;
use tidewatch_core::error::{Result, TidewatchError};
use tidewatch_core::traits::SubscriptionStore;

pub use memory::MemoryStore;
pub use retry::RetryStore;
pub use sqlite::SqliteStore;

/// Create a store backend from configuration, wrapped in the bounded-retry
/// policy every caller is expected to go through.
pub fn create_store(
    config: &StoreConfig,
    path: std::path::PathBuf,
) -> Result<Arc<dyn SubscriptionStore>> {
    match config.backend.as_str() {
        "sqlite" => Ok(Arc::new(RetryStore::with_defaults(SqliteStore::open(&path)?))),
        "memory" => Ok(Arc::new(RetryStore::with_defaults(MemoryStore::new()))),
        other => Err(TidewatchError::Config(format!(
            "unknown store backend: {other}"
        ))),
    }
}
