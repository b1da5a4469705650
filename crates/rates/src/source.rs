//! Rate sources: where a USD→UZS multiplier comes from.

use async_trait::async_trait;
use thiserror::Error;

/// Rate-fetch failure. Never fatal to the application: the provider stores
/// the message and keeps serving the last known rate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RateError {
    #[error("rate request failed: {0}")]
    Http(String),

    #[error("rate response malformed: {0}")]
    Malformed(String),
}

/// Supplies the current USD→UZS multiplier (UZS per 1 USD).
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch_usd_rate(&self) -> Result<f64, RateError>;
}

/// HTTP-backed source for `open.er-api.com`-shaped endpoints:
/// a JSON body with `{"rates": {"UZS": <number>, ...}}`.
pub struct HttpRateSource {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpRateSource {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl RateSource for HttpRateSource {
    async fn fetch_usd_rate(&self) -> Result<f64, RateError> {
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| RateError::Http(e.to_string()))?
            .error_for_status()
            .map_err(|e| RateError::Http(e.to_string()))?;

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| RateError::Malformed(e.to_string()))?;

        let rate = body
            .get("rates")
            .and_then(|rates| rates.get("UZS"))
            .and_then(serde_json::Value::as_f64)
            .ok_or_else(|| RateError::Malformed("missing rates.UZS".to_string()))?;

        if !rate.is_finite() || rate <= 0.0 {
            return Err(RateError::Malformed(format!(
                "rates.UZS is not a positive number: {rate}"
            )));
        }

        Ok(rate)
    }
}

/// Fixed-value source for tests and development.
pub struct StaticRateSource(pub f64);

#[async_trait]
impl RateSource for StaticRateSource {
    async fn fetch_usd_rate(&self) -> Result<f64, RateError> {
        Ok(self.0)
    }
}
