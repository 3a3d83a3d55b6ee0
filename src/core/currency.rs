//! Currency conversion abstractions

use crate::core::error::ConversionError;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::fmt::Display;

/// An uppercase currency code such as `USD`.
///
/// No attempt is made to check that the code names a real currency; the remote
/// rate service is the only authority on that.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Normalizes `code`, rejecting absent or blank input.
    ///
    /// Codes become path segments in the disk store, so only ASCII letters and
    /// digits are accepted.
    pub fn parse(code: Option<&str>) -> Result<Self, ConversionError> {
        let code = match code.map(str::trim) {
            Some(c) if !c.is_empty() => c,
            _ => {
                return Err(ConversionError::InvalidInput(
                    "currencies cannot be empty".to_string(),
                ));
            }
        };
        if !code.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ConversionError::InvalidInput(format!(
                "invalid currency code: {code:?}"
            )));
        }
        Ok(Self(code.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifies a cached rate: one currency pair within one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RateKey {
    pub date: NaiveDate,
    pub from: CurrencyCode,
    pub to: CurrencyCode,
}

impl RateKey {
    pub fn new(date: NaiveDate, from: CurrencyCode, to: CurrencyCode) -> Self {
        Self { date, from, to }
    }
}

impl Display for RateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.date.format("%Y-%m-%d"), self.from, self.to)
    }
}

#[async_trait]
pub trait CurrencyRateProvider: Send + Sync {
    async fn get_rate(&self, from: &str, to: &str) -> Result<f64, ConversionError>;
}
