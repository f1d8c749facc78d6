//! Serverless-style entry point: proxy event in, `{statusCode, headers, body}` out.

use crate::core::config::AppConfig;
use crate::core::{
    ConversionRequest, ConversionResult, ConvertError, ConvertResult, RateProvider, convert,
};
use crate::providers::FloatRatesProvider;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

pub const USD_AMOUNT_PARAM: &str = "usd_amount";

/// The subset of an API gateway proxy event the handler reads.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyEvent {
    #[serde(default)]
    pub query_string_parameters: Option<HashMap<String, String>>,
}

impl ProxyEvent {
    pub fn with_usd_amount(raw: impl Into<String>) -> Self {
        ProxyEvent {
            query_string_parameters: Some(HashMap::from([(
                USD_AMOUNT_PARAM.to_string(),
                raw.into(),
            )])),
        }
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.query_string_parameters
            .as_ref()
            .and_then(|params| params.get(key))
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

impl ProxyResponse {
    fn json(status_code: u16, body: String) -> Self {
        ProxyResponse {
            status_code,
            headers: BTreeMap::from([("Content-Type".to_string(), "application/json".to_string())]),
            body,
        }
    }

    pub fn from_error(err: &ConvertError) -> Self {
        let body = ErrorBody {
            error: err.kind(),
            message: err.to_string(),
        };
        match serde_json::to_string(&body) {
            Ok(body) => Self::json(err.status_code(), body),
            Err(e) => Self::internal_error(&e),
        }
    }

    pub fn from_result(result: &ConvertResult<ConversionResult>) -> Self {
        match result {
            Ok(amounts) => match serde_json::to_string(amounts) {
                Ok(body) => Self::json(200, body),
                Err(e) => Self::internal_error(&e),
            },
            Err(err) => Self::from_error(err),
        }
    }

    fn internal_error(e: &serde_json::Error) -> Self {
        error!(error = %e, "Failed to encode response body");
        Self::json(
            500,
            r#"{"error":"internal_error","message":"Failed to encode response body"}"#.to_string(),
        )
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// Converts USD amounts into a fixed, ordered list of currencies.
///
/// Holds no per-request state, so one instance serves any number of concurrent invocations.
pub struct ConversionHandler {
    provider: Arc<dyn RateProvider>,
    targets: Vec<String>,
}

impl ConversionHandler {
    pub fn new(provider: Arc<dyn RateProvider>, targets: Vec<String>) -> Self {
        ConversionHandler { provider, targets }
    }

    /// Builds a handler backed by the floatrates feed described in `config`.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let provider = FloatRatesProvider::from_config(&config.rate_source)?;
        debug!(url = provider.url(), targets = ?config.target_currencies, "Created handler");
        Ok(Self::new(
            Arc::new(provider),
            config.target_currencies.clone(),
        ))
    }

    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    /// Parses the event, fetches fresh rates and converts.
    #[instrument(name = "Convert", skip_all)]
    pub async fn run(&self, event: &ProxyEvent) -> ConvertResult<ConversionResult> {
        // Reject bad input before touching the network
        let request = ConversionRequest::parse(event.param(USD_AMOUNT_PARAM))?;
        debug!(usd_amount = request.usd_amount, "Parsed request");
        let rates = self.provider.fetch_rates().await?;
        convert(&request, &rates, &self.targets)
    }

    /// Like [`run`](Self::run), but resolves to [`ConvertError::Cancelled`] as soon as `cancel` completes.
    pub async fn run_until<F>(&self, event: &ProxyEvent, cancel: F) -> ConvertResult<ConversionResult>
    where
        F: Future<Output = ()>,
    {
        // Dropping the losing branch aborts the in-flight fetch
        tokio::select! {
            result = self.run(event) => result,
            _ = cancel => Err(ConvertError::Cancelled),
        }
    }

    pub async fn handle(&self, event: &ProxyEvent) -> ProxyResponse {
        let result = self.run(event).await;
        Self::respond(&result)
    }

    pub async fn handle_until<F>(&self, event: &ProxyEvent, cancel: F) -> ProxyResponse
    where
        F: Future<Output = ()>,
    {
        let result = self.run_until(event, cancel).await;
        Self::respond(&result)
    }

    fn respond(result: &ConvertResult<ConversionResult>) -> ProxyResponse {
        let response = ProxyResponse::from_result(result);
        match result {
            Ok(_) => info!(status = response.status_code, "Conversion completed"),
            Err(e) => warn!(status = response.status_code, error = %e, "Conversion failed"),
        }
        response
    }
}
