use crate::core::cache::{CacheError, RateStore, decode_rate, encode_rate};
use crate::core::currency::RateKey;
use async_trait::async_trait;
use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

const PARTITION: &str = "rates";

/// Rate store backed by an embedded fjall keyspace. Keys are `date/FROM/TO`.
pub struct KeyspaceRateStore {
    _keyspace: Arc<Keyspace>,
    partition: PartitionHandle,
}

impl KeyspaceRateStore {
    pub fn open(path: &Path) -> Result<Self, CacheError> {
        std::fs::create_dir_all(path)?;

        let keyspace = Config::new(path).open()?;
        let partition = keyspace.open_partition(PARTITION, PartitionCreateOptions::default())?;
        Ok(Self {
            _keyspace: Arc::new(keyspace),
            partition,
        })
    }
}

#[async_trait]
impl RateStore for KeyspaceRateStore {
    async fn exists(&self, key: &RateKey) -> bool {
        self.partition.contains_key(key.to_string()).unwrap_or(false)
    }

    async fn read(&self, key: &RateKey) -> Result<f64, CacheError> {
        let Some(value) = self.partition.get(key.to_string())? else {
            debug!("Cache MISS for key: {}", key);
            return Err(CacheError::NotFound(key.clone()));
        };

        let raw = std::str::from_utf8(&value).map_err(|e| CacheError::Malformed {
            key: key.clone(),
            reason: e.to_string(),
        })?;
        let rate = decode_rate(key, raw)?;
        debug!("Cache HIT for key: {}", key);
        Ok(rate)
    }

    async fn write(&self, key: &RateKey, rate: f64) -> Result<(), CacheError> {
        self.partition.insert(key.to_string(), encode_rate(rate))?;
        debug!("Cache PUT for key: {}", key);
        Ok(())
    }
}
