//! Core business logic abstractions

pub mod cache;
pub mod clock;
pub mod config;
pub mod currency;
pub mod error;
pub mod log;

// Re-export main types for cleaner imports
pub use cache::{CacheError, RateStore};
pub use clock::{Clock, FixedClock, SystemClock};
pub use currency::{CurrencyCode, CurrencyRateProvider, RateKey};
pub use error::ConversionError;
