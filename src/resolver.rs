//! Resolves exchange rates through the day-partitioned cache.
//!
//! Concurrent calls for the same pair on the same day are not serialized: both
//! may miss, fetch and write, and the last write wins. Callers that need at most
//! one fetch per pair and day must serialize those calls themselves.

use crate::core::cache::RateStore;
use crate::core::clock::{Clock, SystemClock};
use crate::core::currency::{CurrencyCode, CurrencyRateProvider, RateKey};
use crate::core::error::{ConversionError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

#[derive(Clone)]
pub struct RateResolver {
    fetcher: Arc<dyn CurrencyRateProvider>,
    store: Arc<dyn RateStore>,
    clock: Arc<dyn Clock>,
}

impl RateResolver {
    pub fn new(fetcher: Arc<dyn CurrencyRateProvider>, store: Arc<dyn RateStore>) -> Self {
        Self {
            fetcher,
            store,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Cache key for `from -> to` today, or `None` for an identity conversion.
    pub fn key_for(&self, from: &str, to: &str) -> Result<Option<RateKey>> {
        let from = CurrencyCode::parse(Some(from))?;
        let to = CurrencyCode::parse(Some(to))?;
        if from == to {
            return Ok(None);
        }
        Ok(Some(RateKey::new(self.clock.today(), from, to)))
    }

    /// Returns the multiplier converting an amount in `from` into `to`.
    ///
    /// Absent or blank codes fail with [`ConversionError::InvalidInput`]; every
    /// other failure is a [`ConversionError::FailedConversion`].
    #[instrument(name = "ResolveRate", skip(self))]
    pub async fn resolve_rate(&self, from: Option<&str>, to: Option<&str>) -> Result<f64> {
        let from = CurrencyCode::parse(from)?;
        let to = CurrencyCode::parse(to)?;
        if from == to {
            return Ok(1.0);
        }

        // One date per call so the read and the write hit the same partition.
        let key = RateKey::new(self.clock.today(), from, to);

        match self.store.read(&key).await {
            Ok(rate) => {
                debug!(key = %key, rate, "Cache hit");
                return Ok(rate);
            }
            Err(e) if e.is_miss() => debug!(key = %key, reason = %e, "Cache miss"),
            Err(e) => warn!(key = %key, error = %e, "Cache read failed, fetching instead"),
        }

        let rate = self
            .fetcher
            .get_rate(key.from.as_str(), key.to.as_str())
            .await
            .map_err(ConversionError::into_failed)?;

        // Caching is an optimization; a failed write never fails the call.
        if let Err(e) = self.store.write(&key, rate).await {
            warn!(key = %key, error = %e, "Failed to cache rate");
        }
        Ok(rate)
    }

    pub async fn resolve(&self, from: &str, to: &str) -> Result<f64> {
        self.resolve_rate(Some(from), Some(to)).await
    }
}

#[async_trait]
impl CurrencyRateProvider for RateResolver {
    async fn get_rate(&self, from: &str, to: &str) -> Result<f64, ConversionError> {
        self.resolve(from, to).await
    }
}
