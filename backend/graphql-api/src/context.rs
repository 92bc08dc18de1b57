//! Process-wide data-access handle injected into the GraphQL schema

use std::sync::Arc;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::error::StoreResult;
use crate::store::{MemoryStore, PgStore, Store};

/// URL scheme selecting the in-memory backend
pub const MEMORY_URL: &str = "memory://";

/// Shared handle to the store, cheap to clone
#[derive(Clone)]
pub struct DataContext {
    store: Arc<dyn Store>,
}

impl DataContext {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Build the context described by `config`; fails if the database is unreachable
    pub async fn connect(config: &DatabaseConfig) -> StoreResult<Self> {
        if config.pool.database_url.starts_with(MEMORY_URL) {
            info!("Using in-memory store");
            return Ok(Self::in_memory());
        }

        let store = PgStore::connect(config.pool.clone()).await?;
        if config.run_migrations {
            store.migrate().await?;
        }

        Ok(Self::new(Arc::new(store)))
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    /// Release the underlying connections
    pub async fn close(&self) {
        self.store.close().await;
    }
}
