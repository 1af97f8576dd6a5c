use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use serde::Deserialize;

use cpb_core::{
    market::{ForexPort, MarketError, MarketResult},
    Result,
};

use crate::{get_json, http_client};

/// `GET /latest?base=USD&symbols=XXX` response.
///
/// Some providers answer HTTP 200 with `success: false` and an `error` object
/// instead of `rates`.
#[derive(Debug, Deserialize)]
struct LatestRates {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    rates: HashMap<String, f64>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Clone, Debug)]
pub struct ForexClient {
    base_url: String,
    api_key: Option<String>,
    http: reqwest::Client,
}

impl ForexClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            http: http_client(timeout)?,
        })
    }
}

#[async_trait]
impl ForexPort for ForexClient {
    async fn usd_rate(&self, currency: &str) -> MarketResult<f64> {
        let url = format!("{}/latest", self.base_url);
        let mut query = vec![("base", "USD"), ("symbols", currency)];
        if let Some(key) = self.api_key.as_deref() {
            query.push(("access_key", key));
        }

        let body: LatestRates = get_json(&self.http, &url, &query).await?;

        if body.success == Some(false) {
            let detail = body
                .error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown error".to_string());
            return Err(MarketError::Malformed(format!("forex api error: {detail}")));
        }

        let rate = body
            .rates
            .get(currency)
            .copied()
            .ok_or_else(|| MarketError::Malformed(format!("rates.{currency} missing")))?;
        if !rate.is_finite() || rate <= 0.0 {
            return Err(MarketError::Malformed(format!("rates.{currency} = {rate}")));
        }
        Ok(rate)
    }
}
