use crate::core::{CurrencyCode, RateError, RateProvider, RateTable};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the exchangerate-api.com v6 `latest` endpoint.
pub struct ExchangeRateApiProvider {
    base_url: String,
    api_key: Option<String>,
}

impl ExchangeRateApiProvider {
    pub fn new(base_url: &str, api_key: Option<String>) -> Self {
        ExchangeRateApiProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }
}

#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    result: String,
    #[serde(rename = "error-type")]
    error_type: Option<String>,
    time_last_update_unix: Option<i64>,
    #[serde(default)]
    conversion_rates: HashMap<String, f64>,
}

#[async_trait]
impl RateProvider for ExchangeRateApiProvider {
    async fn latest(&self, base: &CurrencyCode) -> Result<RateTable, RateError> {
        // Checked before building the request: without a key there is
        // nothing useful to send.
        let key = match self.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => key,
            _ => return Err(RateError::MissingCredential),
        };

        // The URL embeds the key, so only the base currency is logged.
        let url = format!("{}/v6/{}/latest/{}", self.base_url, key, base);
        debug!("Requesting latest rates for base {}", base);

        let client = reqwest::Client::builder()
            .user_agent("fxconv/0.1")
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        let response = client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RateError::Http {
                status: status.as_u16(),
                reason: status
                    .canonical_reason()
                    .unwrap_or("unknown status")
                    .to_string(),
            });
        }

        let body = response.bytes().await?;
        let parsed: LatestRatesResponse = serde_json::from_slice(&body)?;

        // The endpoint reports failures inside a 200 body.
        if parsed.result != "success" {
            return Err(RateError::Provider(
                parsed
                    .error_type
                    .unwrap_or_else(|| "unknown-error".to_string()),
            ));
        }

        let fetched_at = parsed
            .time_last_update_unix
            .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0));

        debug!(
            "Fetched {} rates for base {}",
            parsed.conversion_rates.len(),
            base
        );

        Ok(RateTable::from_raw(
            base.clone(),
            fetched_at,
            parsed.conversion_rates,
        ))
    }
}
