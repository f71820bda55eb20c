//! Table list cache using moka
//!
//! The type selector needs the registry's full table list every time an
//! Object is added. The list changes rarely, so it is cached with a TTL and
//! concurrent first loads are coalesced into one registry call.

use crate::error::RegistryError;
use crate::registry::SchemaRegistry;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

const TABLES_KEY: &str = "tables";

/// Cached view of `GET /api/schema/tables`
#[derive(Debug, Clone)]
pub struct TableCatalog {
    inner: Cache<&'static str, Arc<[String]>>,
}

impl TableCatalog {
    /// Create catalog whose entry expires after `ttl`
    #[inline]
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Cache::builder().max_capacity(1).time_to_live(ttl).build(),
        }
    }

    /// Table list, fetched from `registry` on miss
    ///
    /// # Errors
    /// The registry error of the (shared) failed fetch; failures are not cached
    pub async fn tables(&self, registry: &dyn SchemaRegistry) -> Result<Arc<[String]>, RegistryError> {
        self.inner
            .try_get_with(TABLES_KEY, async {
                let response = registry.list_tables().await?;
                tracing::debug!(count = response.tables.len(), "table list loaded");
                Ok::<_, RegistryError>(Arc::from(response.tables))
            })
            .await
            .map_err(|e| (*e).clone())
    }

    /// Drop the cached list
    #[inline]
    pub fn invalidate(&self) {
        self.inner.invalidate_all();
    }
}

impl Default for TableCatalog {
    /// Five-minute TTL
    fn default() -> Self {
        Self::new(Duration::from_secs(300))
    }
}
