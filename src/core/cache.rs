//! Rate storage abstraction
//!
//! A store maps a [`RateKey`] to a single rate. Keys are day-partitioned, so an
//! entry written today is simply never looked up again once the date changes.

use crate::core::currency::RateKey;
use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("No cache entry for {0}")]
    NotFound(RateKey),

    #[error("Malformed cache entry for {key}: {reason}")]
    Malformed { key: RateKey, reason: String },

    #[error("Cache IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cache keyspace error: {0}")]
    Keyspace(#[from] fjall::Error),
}

impl CacheError {
    /// Whether the resolver should fall back to fetching.
    pub fn is_miss(&self) -> bool {
        matches!(self, CacheError::NotFound(_) | CacheError::Malformed { .. })
    }
}

#[async_trait]
pub trait RateStore: Send + Sync {
    async fn exists(&self, key: &RateKey) -> bool;

    async fn read(&self, key: &RateKey) -> Result<f64, CacheError>;

    async fn write(&self, key: &RateKey, rate: f64) -> Result<(), CacheError>;
}

/// Parses a stored rate. The payload must be exactly one finite decimal number,
/// optionally followed by a newline.
pub fn decode_rate(key: &RateKey, raw: &str) -> Result<f64, CacheError> {
    let malformed = |reason: &str| CacheError::Malformed {
        key: key.clone(),
        reason: reason.to_string(),
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(malformed("empty entry"));
    }
    if trimmed.lines().count() > 1 {
        return Err(malformed("more than one line"));
    }

    let rate: f64 = trimmed
        .parse()
        .map_err(|e: std::num::ParseFloatError| malformed(&e.to_string()))?;
    if !rate.is_finite() {
        return Err(malformed("not a finite number"));
    }
    Ok(rate)
}

pub fn encode_rate(rate: f64) -> String {
    format!("{rate}\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::currency::CurrencyCode;
    use chrono::NaiveDate;

    fn key() -> RateKey {
        RateKey::new(
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            CurrencyCode::parse(Some("EUR")).unwrap(),
            CurrencyCode::parse(Some("CHF")).unwrap(),
        )
    }

    #[test]
    fn test_decode_rate() {
        assert_eq!(decode_rate(&key(), "0.9412\n").unwrap(), 0.9412);
        assert_eq!(decode_rate(&key(), "  1.5 ").unwrap(), 1.5);
    }

    #[test]
    fn test_decode_rate_rejects_bad_payloads() {
        for raw in ["", "\n", "abc", "1.2\n3.4", "NaN", "inf"] {
            let err = decode_rate(&key(), raw).unwrap_err();
            assert!(err.is_miss(), "{raw:?} should be a miss");
            assert!(matches!(err, CacheError::Malformed { .. }));
        }
    }

    #[test]
    fn test_encoded_rate_decodes_exactly() {
        let rate = 1.0 / 1.5;
        assert_eq!(decode_rate(&key(), &encode_rate(rate)).unwrap(), rate);
    }

    #[test]
    fn test_io_error_is_not_a_miss() {
        let err = CacheError::from(std::io::Error::other("disk full"));
        assert!(!err.is_miss());
    }
}
