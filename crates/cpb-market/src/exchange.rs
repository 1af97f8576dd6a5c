use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use cpb_core::{
    market::{types::parse_decimal, ExchangePort, MarketResult, PriceStats},
    Result,
};

use crate::{get_json, http_client};

/// `GET /ticker/price` response. Numbers arrive as decimal strings.
#[derive(Debug, Deserialize)]
struct TickerPrice {
    price: String,
}

/// `GET /ticker/24hr` response (only the fields the bot shows).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Ticker24h {
    last_price: String,
    price_change_percent: String,
    high_price: String,
    low_price: String,
    volume: String,
}

impl Ticker24h {
    fn into_stats(self) -> MarketResult<PriceStats> {
        Ok(PriceStats {
            price: parse_decimal("lastPrice", &self.last_price)?,
            change_percent: parse_decimal("priceChangePercent", &self.price_change_percent)?,
            high: parse_decimal("highPrice", &self.high_price)?,
            low: parse_decimal("lowPrice", &self.low_price)?,
            volume: parse_decimal("volume", &self.volume)?,
        })
    }
}

/// Public spot endpoints of a Binance-compatible exchange.
#[derive(Clone, Debug)]
pub struct ExchangeClient {
    base_url: String,
    http: reqwest::Client,
}

impl ExchangeClient {
    /// `base_url` includes the API prefix, e.g. `https://api.binance.com/api/v3`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: http_client(timeout)?,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

#[async_trait]
impl ExchangePort for ExchangeClient {
    async fn spot_price(&self, pair: &str) -> MarketResult<f64> {
        let t: TickerPrice =
            get_json(&self.http, &self.url("/ticker/price"), &[("symbol", pair)]).await?;
        parse_decimal("price", &t.price)
    }

    async fn ticker_24h(&self, pair: &str) -> MarketResult<PriceStats> {
        let t: Ticker24h =
            get_json(&self.http, &self.url("/ticker/24hr"), &[("symbol", pair)]).await?;
        t.into_stats()
    }
}
