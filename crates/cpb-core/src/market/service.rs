use std::sync::Arc;

use tracing::debug;

use crate::market::{
    port::{ExchangePort, ForexPort},
    types::{MarketError, MarketResult, PriceStats},
};

const MAX_SYMBOL_LEN: usize = 20;

/// Where a `/convert` amount should end up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConversionTarget {
    /// Priced through the stablecoin pair, no forex lookup.
    Usd,
    Fiat(String),
    Crypto(String),
}

impl ConversionTarget {
    /// `code` must already be upper-cased.
    pub fn classify(code: &str, fiat_currencies: &[String]) -> Self {
        if code == "USD" {
            Self::Usd
        } else if fiat_currencies.iter().any(|c| c == code) {
            Self::Fiat(code.to_string())
        } else {
            Self::Crypto(code.to_string())
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Self::Usd => "USD",
            Self::Fiat(c) | Self::Crypto(c) => c,
        }
    }
}

/// Composes the exchange and forex ports into the bot's price/convert operations.
///
/// Every call goes to the network; nothing is cached.
#[derive(Clone)]
pub struct MarketService {
    exchange: Arc<dyn ExchangePort>,
    forex: Arc<dyn ForexPort>,
    quote_asset: String,
}

impl MarketService {
    pub fn new(
        exchange: Arc<dyn ExchangePort>,
        forex: Arc<dyn ForexPort>,
        quote_asset: impl Into<String>,
    ) -> Self {
        Self {
            exchange,
            forex,
            quote_asset: quote_asset.into().to_uppercase(),
        }
    }

    pub fn quote_asset(&self) -> &str {
        &self.quote_asset
    }

    /// Current price and 24h stats of `symbol` quoted in the stablecoin.
    pub async fn get_price_stats(&self, symbol: &str) -> MarketResult<PriceStats> {
        let symbol = normalize_symbol(symbol)?;
        self.exchange
            .ticker_24h(&format!("{symbol}{}", self.quote_asset))
            .await
    }

    /// USD -> `currency` rate from the forex service.
    pub async fn fiat_rate(&self, currency: &str) -> MarketResult<f64> {
        let currency = normalize_symbol(currency)?;
        self.forex.usd_rate(&currency).await
    }

    /// Value of `amount` of `coin` in USD, via the stablecoin pair.
    pub async fn to_usd(&self, amount: f64, coin: &str) -> MarketResult<f64> {
        let coin = normalize_symbol(coin)?;
        if coin == self.quote_asset {
            return Ok(amount);
        }
        let price = self
            .exchange
            .spot_price(&format!("{coin}{}", self.quote_asset))
            .await?;
        Ok(amount * price)
    }

    /// Coin -> USD -> fiat. Either step failing fails the whole conversion.
    pub async fn to_fiat(&self, amount: f64, coin: &str, currency: &str) -> MarketResult<f64> {
        let usd = self.to_usd(amount, coin).await?;
        let rate = self.fiat_rate(currency).await?;
        Ok(usd * rate)
    }

    /// Crypto -> crypto using the direct `FROMTO` pair.
    ///
    /// When the exchange has no such pair, the rate is crossed through the
    /// stablecoin instead: `price(FROM) / price(TO)`.
    pub async fn convert(&self, amount: f64, from: &str, to: &str) -> MarketResult<f64> {
        let from = normalize_symbol(from)?;
        let to = normalize_symbol(to)?;
        if from == to {
            return Ok(amount);
        }

        match self.exchange.spot_price(&format!("{from}{to}")).await {
            Ok(rate) => Ok(amount * rate),
            Err(e) if e.is_not_found() => {
                debug!(%from, %to, "no direct pair, crossing via {}", self.quote_asset);
                let from_usd = self.to_usd(1.0, &from).await?;
                let to_usd = self.to_usd(1.0, &to).await?;
                if to_usd <= 0.0 {
                    return Err(MarketError::Malformed(format!(
                        "{to}{} price is not positive",
                        self.quote_asset
                    )));
                }
                Ok(amount * from_usd / to_usd)
            }
            Err(e) => Err(e),
        }
    }

    /// Dispatch on an already classified target.
    pub async fn convert_to(
        &self,
        amount: f64,
        from: &str,
        target: &ConversionTarget,
    ) -> MarketResult<f64> {
        match target {
            ConversionTarget::Usd => self.to_usd(amount, from).await,
            ConversionTarget::Fiat(currency) => self.to_fiat(amount, from, currency).await,
            ConversionTarget::Crypto(to) => self.convert(amount, from, to).await,
        }
    }
}

/// Upper-case and validate a ticker or currency code before it hits the network.
pub fn normalize_symbol(raw: &str) -> MarketResult<String> {
    let s = raw.trim().to_uppercase();
    let valid =
        (1..=MAX_SYMBOL_LEN).contains(&s.len()) && s.chars().all(|c| c.is_ascii_alphanumeric());
    if !valid {
        return Err(MarketError::InvalidSymbol(raw.to_string()));
    }
    Ok(s)
}

#[cfg(test)]
pub(crate) mod stubs {
    use std::{
        collections::HashMap,
        sync::{
            atomic::{AtomicUsize, Ordering},
            Mutex,
        },
    };

    use async_trait::async_trait;

    use super::*;

    /// In-memory exchange: unknown pairs answer like the real API (HTTP 400).
    #[derive(Default)]
    pub struct StubExchange {
        pub prices: HashMap<String, f64>,
        pub stats: HashMap<String, PriceStats>,
        pub calls: AtomicUsize,
        pub requested: Mutex<Vec<String>>,
        /// Every request fails as if the exchange were unreachable.
        pub offline: bool,
    }

    impl StubExchange {
        pub fn offline() -> Self {
            Self {
                offline: true,
                ..Default::default()
            }
        }

        pub fn with_prices(prices: &[(&str, f64)]) -> Self {
            Self {
                prices: prices.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
                ..Default::default()
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn record(&self, pair: &str) {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requested
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(pair.to_string());
        }
    }

    fn unknown(pair: &str) -> MarketError {
        MarketError::Status {
            status: 400,
            body: format!("{{\"code\":-1121,\"msg\":\"Invalid symbol {pair}.\"}}"),
        }
    }

    fn connection_refused() -> MarketError {
        MarketError::Network("connection refused".to_string())
    }

    #[async_trait]
    impl ExchangePort for StubExchange {
        async fn spot_price(&self, pair: &str) -> MarketResult<f64> {
            self.record(pair);
            if self.offline {
                return Err(connection_refused());
            }
            self.prices.get(pair).copied().ok_or_else(|| unknown(pair))
        }

        async fn ticker_24h(&self, pair: &str) -> MarketResult<PriceStats> {
            self.record(pair);
            if self.offline {
                return Err(connection_refused());
            }
            self.stats.get(pair).copied().ok_or_else(|| unknown(pair))
        }
    }

    #[derive(Default)]
    pub struct StubForex {
        pub rates: HashMap<String, f64>,
        pub calls: AtomicUsize,
    }

    impl StubForex {
        pub fn with_rates(rates: &[(&str, f64)]) -> Self {
            Self {
                rates: rates.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
                ..Default::default()
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ForexPort for StubForex {
        async fn usd_rate(&self, currency: &str) -> MarketResult<f64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.rates
                .get(currency)
                .copied()
                .ok_or_else(|| MarketError::Network("forex unavailable".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::stubs::{StubExchange, StubForex};
    use super::*;

    fn service(exchange: StubExchange, forex: StubForex) -> (MarketService, Arc<StubExchange>) {
        let exchange = Arc::new(exchange);
        let svc = MarketService::new(exchange.clone(), Arc::new(forex), "usdt");
        (svc, exchange)
    }

    #[tokio::test]
    async fn convert_uses_direct_pair_when_listed() {
        let (svc, ex) = service(
            StubExchange::with_prices(&[("ETHBTC", 0.05)]),
            StubForex::default(),
        );
        let out = svc.convert(2.0, "eth", "btc").await.unwrap();
        assert!((out - 0.1).abs() < 1e-12);
        assert_eq!(ex.calls(), 1);
    }

    #[tokio::test]
    async fn convert_crosses_through_stablecoin_without_direct_pair() {
        let (svc, ex) = service(
            StubExchange::with_prices(&[("ETHUSDT", 3000.0), ("BTCUSDT", 60000.0)]),
            StubForex::default(),
        );
        let out = svc.convert(2.0, "ETH", "BTC").await.unwrap();
        assert!((out - 0.1).abs() < 1e-12);
        let requested = ex.requested.lock().unwrap().clone();
        assert_eq!(requested, vec!["ETHBTC", "ETHUSDT", "BTCUSDT"]);
    }

    #[tokio::test]
    async fn convert_fails_when_a_leg_is_unknown() {
        let (svc, _) = service(
            StubExchange::with_prices(&[("ETHUSDT", 3000.0)]),
            StubForex::default(),
        );
        let err = svc.convert(1.0, "ETH", "NOPE").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn same_symbol_needs_no_network() {
        let (svc, ex) = service(StubExchange::default(), StubForex::default());
        assert_eq!(svc.convert(3.5, "btc", "BTC").await.unwrap(), 3.5);
        assert_eq!(svc.to_usd(4.0, "usdt").await.unwrap(), 4.0);
        assert_eq!(ex.calls(), 0);
    }

    #[tokio::test]
    async fn to_fiat_composes_both_lookups() {
        let (svc, _) = service(
            StubExchange::with_prices(&[("BTCUSDT", 50000.0)]),
            StubForex::with_rates(&[("INR", 83.0)]),
        );
        let out = svc.to_fiat(2.0, "btc", "inr").await.unwrap();
        assert!((out - 8_300_000.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn to_fiat_skips_forex_when_coin_lookup_fails() {
        let forex = Arc::new(StubForex::with_rates(&[("INR", 83.0)]));
        let svc = MarketService::new(Arc::new(StubExchange::default()), forex.clone(), "USDT");
        assert!(svc.to_fiat(1.0, "BTC", "INR").await.is_err());
        assert_eq!(forex.calls(), 0);
    }

    #[tokio::test]
    async fn invalid_symbols_never_reach_the_exchange() {
        let (svc, ex) = service(StubExchange::default(), StubForex::default());
        assert!(matches!(
            svc.get_price_stats("btc/usd").await,
            Err(MarketError::InvalidSymbol(_))
        ));
        assert!(svc.get_price_stats("").await.is_err());
        assert!(svc.get_price_stats(&"A".repeat(MAX_SYMBOL_LEN + 1)).await.is_err());
        assert_eq!(ex.calls(), 0);
    }

    #[test]
    fn single_letter_tickers_are_valid() {
        assert_eq!(normalize_symbol(" t ").unwrap(), "T");
        assert_eq!(normalize_symbol(&"a".repeat(MAX_SYMBOL_LEN)).unwrap().len(), MAX_SYMBOL_LEN);
    }

    #[test]
    fn classifies_targets() {
        let fiat = vec!["INR".to_string(), "EUR".to_string()];
        assert_eq!(ConversionTarget::classify("USD", &fiat), ConversionTarget::Usd);
        assert_eq!(
            ConversionTarget::classify("EUR", &fiat),
            ConversionTarget::Fiat("EUR".to_string())
        );
        assert_eq!(
            ConversionTarget::classify("BTC", &fiat),
            ConversionTarget::Crypto("BTC".to_string())
        );
    }
}
