pub mod disk;
pub mod keyspace;
pub mod memory;

use crate::core::cache::{CacheError, RateStore};
use crate::core::config::{CacheBackend, CacheConfig};
use disk::DiskRateStore;
use keyspace::KeyspaceRateStore;
use memory::MemoryRateStore;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Builds the configured backend rooted at `path`.
pub fn open_store(config: &CacheConfig, path: &Path) -> Result<Arc<dyn RateStore>, CacheError> {
    debug!(backend = ?config.backend, path = %path.display(), "Opening rate store");
    let store: Arc<dyn RateStore> = match config.backend {
        CacheBackend::Disk => Arc::new(DiskRateStore::new(path)),
        CacheBackend::Memory => Arc::new(MemoryRateStore::new()),
        CacheBackend::Keyspace => Arc::new(KeyspaceRateStore::open(path)?),
    };
    Ok(store)
}
