use crate::core::config::ProviderConfig;
use crate::core::currency::{CurrencyCode, CurrencyRateProvider};
use crate::core::error::ConversionError;
use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};

use super::util::with_retry;

#[derive(Deserialize, Debug)]
struct LatestRatesResponse {
    data: HashMap<String, f64>,
}

/// Derives the `from -> to` rate from a latest-rates payload.
///
/// Both values in `data` are quoted against the same base currency, so the
/// pairwise rate is `data[to] / data[from]`.
pub fn parse_rates(body: &str, from: &str, to: &str) -> Result<f64, ConversionError> {
    let response: LatestRatesResponse = serde_json::from_str(body)?;

    let (Some(from_value), Some(to_value)) = (response.data.get(from), response.data.get(to))
    else {
        return Err(ConversionError::failed("exchange rate data unavailable"));
    };

    let rate = to_value / from_value;
    if !rate.is_finite() || rate <= 0.0 {
        return Err(ConversionError::failed(format!(
            "invalid exchange rate {rate} for {from} -> {to}"
        )));
    }
    Ok(rate)
}

// CurrencyApiProvider fetches both currencies of a pair in one request
pub struct CurrencyApiProvider {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
    retries: usize,
    retry_delay_ms: u64,
}

impl CurrencyApiProvider {
    pub fn new(base_url: &str, api_key: Option<String>) -> Result<Self, ConversionError> {
        Self::from_config(
            &ProviderConfig {
                base_url: base_url.to_string(),
                ..ProviderConfig::default()
            },
            api_key,
        )
    }

    pub fn from_config(
        config: &ProviderConfig,
        api_key: Option<String>,
    ) -> Result<Self, ConversionError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ConversionError::failed(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: config.base_url.clone(),
            api_key,
            client,
            retries: config.retries,
            retry_delay_ms: config.retry_delay_ms,
        })
    }

    fn request_url(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
    ) -> Result<Url, ConversionError> {
        let currencies = format!("{from},{to}");
        let mut params = Vec::with_capacity(2);
        if let Some(key) = &self.api_key {
            params.push(("apikey", key.as_str()));
        }
        params.push(("currencies", currencies.as_str()));

        Url::parse_with_params(&self.base_url, &params).map_err(|e| {
            ConversionError::failed(format!("invalid rate service URL {}: {e}", self.base_url))
        })
    }

    // reqwest errors carry the request URL, which includes the API key.
    async fn request(&self, url: &Url) -> Result<String, ConversionError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| {
                ConversionError::failed(format!("request error: {}", e.without_url()))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<unreadable body: {}>", e.without_url()));
            return Err(ConversionError::failed(format!(
                "HTTP error: {status}: {body}"
            )));
        }

        response.text().await.map_err(|e| {
            ConversionError::failed(format!("failed to read response: {}", e.without_url()))
        })
    }

    #[instrument(name = "CurrencyApiFetch", skip(self), fields(from = %from, to = %to))]
    pub async fn fetch(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
    ) -> Result<f64, ConversionError> {
        let url = self.request_url(from, to)?;
        debug!("Requesting latest rates from {}", self.base_url);

        let url = &url;
        let body = with_retry(move || self.request(url), self.retries, self.retry_delay_ms)
            .await
            .inspect_err(|e| debug!(error = %e, "Rate request failed"))?;

        let rate = parse_rates(&body, from.as_str(), to.as_str())
            .map_err(ConversionError::into_failed)?;
        debug!(rate, "Received rate");
        Ok(rate)
    }
}

#[async_trait]
impl CurrencyRateProvider for CurrencyApiProvider {
    async fn get_rate(&self, from: &str, to: &str) -> Result<f64, ConversionError> {
        let from = CurrencyCode::parse(Some(from))?;
        let to = CurrencyCode::parse(Some(to))?;
        self.fetch(&from, &to).await
    }
}
