use std::sync::Arc;

use tracing::info;

use cpb_core::{config::Config, market::MarketService};
use cpb_market::{ExchangeClient, ForexClient};

#[tokio::main]
async fn main() -> Result<(), cpb_core::Error> {
    cpb_core::logging::init("cpb")?;

    let cfg = Arc::new(Config::load()?);

    let exchange = Arc::new(ExchangeClient::new(
        cfg.market_api_url.clone(),
        cfg.http_timeout,
    )?);
    let forex = Arc::new(ForexClient::new(
        cfg.forex_api_url.clone(),
        cfg.forex_api_key.clone(),
        cfg.http_timeout,
    )?);
    let market = MarketService::new(exchange, forex, cfg.quote_asset.clone());

    info!(
        market = %cfg.market_api_url,
        forex = %cfg.forex_api_url,
        "market data clients ready"
    );

    cpb_telegram::router::run_polling(cfg, market)
        .await
        .map_err(|e| cpb_core::Error::External(format!("telegram bot failed: {e}")))?;

    Ok(())
}
