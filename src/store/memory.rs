use crate::core::cache::{CacheError, RateStore};
use crate::core::currency::RateKey;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// In-memory rate store. Entries live as long as the store itself.
#[derive(Clone, Default)]
pub struct MemoryRateStore {
    inner: Arc<Mutex<HashMap<RateKey, f64>>>,
}

impl MemoryRateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }
}

#[async_trait]
impl RateStore for MemoryRateStore {
    async fn exists(&self, key: &RateKey) -> bool {
        self.inner.lock().await.contains_key(key)
    }

    async fn read(&self, key: &RateKey) -> Result<f64, CacheError> {
        let cache = self.inner.lock().await;
        match cache.get(key) {
            Some(rate) => {
                debug!("Cache HIT for key: {}", key);
                Ok(*rate)
            }
            None => {
                debug!("Cache MISS for key: {}", key);
                Err(CacheError::NotFound(key.clone()))
            }
        }
    }

    async fn write(&self, key: &RateKey, rate: f64) -> Result<(), CacheError> {
        let mut cache = self.inner.lock().await;
        debug!("Cache PUT for key: {}", key);
        cache.insert(key.clone(), rate);
        Ok(())
    }
}
