use crate::core::config::RateSourceConfig;
use crate::core::{ConvertError, ConvertResult, RateProvider, RateTable};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument, warn};

const DAILY_USD_PATH: &str = "/daily/usd.json";

/// Client for the floatrates daily feed (`/daily/usd.json`).
pub struct FloatRatesProvider {
    url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl FloatRatesProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("pecan/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(FloatRatesProvider {
            url: format!("{}{}", base_url.trim_end_matches('/'), DAILY_USD_PATH),
            timeout,
            client,
        })
    }

    pub fn from_config(config: &RateSourceConfig) -> Result<Self> {
        Self::new(&config.base_url, config.timeout())
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn transport_error(&self, e: reqwest::Error) -> ConvertError {
        if e.is_timeout() {
            ConvertError::Upstream(format!(
                "Request to {} timed out after {:?}",
                self.url, self.timeout
            ))
        } else {
            ConvertError::Upstream(format!("Request error: {} URL: {}", e, self.url))
        }
    }
}

#[async_trait]
impl RateProvider for FloatRatesProvider {
    #[instrument(name = "FloatRatesFetch", skip(self))]
    async fn fetch_rates(&self) -> ConvertResult<RateTable> {
        debug!(url = %self.url, "Requesting rate table");

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "Rate source returned an error status");
            return Err(ConvertError::Upstream(format!(
                "HTTP error: {} from {}",
                response.status(),
                self.url
            )));
        }

        // Body errors after a 2xx are still transport failures
        let text = response.text().await.map_err(|e| self.transport_error(e))?;
        let table = RateTable::from_json(&text)?;
        debug!(currencies = table.len(), "Received rate table");
        Ok(table)
    }
}
