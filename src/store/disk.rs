use crate::core::cache::{CacheError, RateStore, decode_rate, encode_rate};
use crate::core::currency::RateKey;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Filesystem rate store laid out as `<root>/<date>/<FROM>/<TO>.txt`.
///
/// Writers to the same key are not serialized; the last one wins.
#[derive(Debug, Clone)]
pub struct DiskRateStore {
    root: PathBuf,
}

impl DiskRateStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn entry_path(&self, key: &RateKey) -> PathBuf {
        self.root
            .join(key.date.format(DATE_FORMAT).to_string())
            .join(key.from.as_str())
            .join(format!("{}.txt", key.to))
    }

    /// Removes every date partition older than `cutoff`. Directories whose name
    /// is not a date are left untouched.
    pub async fn prune_before(&self, cutoff: NaiveDate) -> Result<usize, CacheError> {
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let mut removed = 0;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(date) = name
                .to_str()
                .and_then(|n| NaiveDate::parse_from_str(n, DATE_FORMAT).ok())
            else {
                continue;
            };
            if date < cutoff && entry.file_type().await?.is_dir() {
                fs::remove_dir_all(entry.path()).await?;
                debug!("Pruned cache partition {}", date);
                removed += 1;
            }
        }
        Ok(removed)
    }
}

#[async_trait]
impl RateStore for DiskRateStore {
    async fn exists(&self, key: &RateKey) -> bool {
        fs::try_exists(self.entry_path(key)).await.unwrap_or(false)
    }

    async fn read(&self, key: &RateKey) -> Result<f64, CacheError> {
        let path = self.entry_path(key);
        let raw = match fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Cache MISS for key: {}", key);
                return Err(CacheError::NotFound(key.clone()));
            }
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                return Err(CacheError::Malformed {
                    key: key.clone(),
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let rate = decode_rate(key, &raw)?;
        debug!("Cache HIT for key: {}", key);
        Ok(rate)
    }

    async fn write(&self, key: &RateKey, rate: f64) -> Result<(), CacheError> {
        let path = self.entry_path(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.inspect_err(|e| {
                warn!(path = %parent.display(), error = %e, "Failed to create cache partition")
            })?;
        }
        fs::write(&path, encode_rate(rate)).await?;
        debug!("Cache PUT for key: {}", key);
        Ok(())
    }
}
