pub mod currencyapi;
pub mod util;

pub use currencyapi::{CurrencyApiProvider, parse_rates};
