use async_trait::async_trait;

use crate::market::types::{MarketResult, PriceStats};

/// Public REST endpoints of a crypto exchange.
///
/// `pair` is always the upper-cased concatenation of two tickers (`ETHBTC`).
#[async_trait]
pub trait ExchangePort: Send + Sync {
    /// Last trade price of `pair`.
    async fn spot_price(&self, pair: &str) -> MarketResult<f64>;

    /// Price plus rolling 24h statistics of `pair`.
    async fn ticker_24h(&self, pair: &str) -> MarketResult<PriceStats>;
}

/// Foreign-exchange rate lookup.
#[async_trait]
pub trait ForexPort: Send + Sync {
    /// How many units of `currency` one USD buys.
    async fn usd_rate(&self, currency: &str) -> MarketResult<f64>;
}
