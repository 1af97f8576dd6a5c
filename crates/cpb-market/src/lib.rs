//! Market data adapters (exchange ticker + forex rates) over HTTP.
//!
//! Implements the `cpb-core` market ports with `reqwest`. No retries; every
//! request carries the configured timeout.

use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::debug;

use cpb_core::{errors::Error, market::MarketError, Result};

pub mod exchange;
pub mod forex;

pub use exchange::ExchangeClient;
pub use forex::ForexClient;

const ERROR_BODY_PREVIEW: usize = 200;

pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("cpb/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| Error::External(format!("http client build error: {e}")))
}

/// GET `url` with `query` and decode a JSON body.
///
/// Transport failures, non-success statuses and undecodable bodies map to the
/// three distinct `MarketError` kinds.
pub(crate) async fn get_json<T: DeserializeOwned>(
    http: &reqwest::Client,
    url: &str,
    query: &[(&str, &str)],
) -> std::result::Result<T, MarketError> {
    debug!(%url, ?query, "GET");

    let resp = http
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(|e| MarketError::Network(e.to_string()))?;

    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|e| MarketError::Network(e.to_string()))?;

    if !status.is_success() {
        return Err(MarketError::Status {
            status: status.as_u16(),
            body: body.chars().take(ERROR_BODY_PREVIEW).collect(),
        });
    }

    serde_json::from_str(&body).map_err(|e| MarketError::Malformed(e.to_string()))
}
