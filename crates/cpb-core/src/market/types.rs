/// 24h ticker snapshot for a trading pair. Fetched fresh on every request.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PriceStats {
    pub price: f64,
    pub change_percent: f64,
    pub high: f64,
    pub low: f64,
    pub volume: f64,
}

/// Why a market data lookup failed.
///
/// Command handlers collapse all of these into one user-facing "upstream
/// unavailable" reply; the distinction is kept for logs and for the
/// direct-pair fallback in `MarketService::convert`.
#[derive(Debug, thiserror::Error)]
pub enum MarketError {
    #[error("invalid symbol: {0}")]
    InvalidSymbol(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("upstream returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed upstream payload: {0}")]
    Malformed(String),
}

impl MarketError {
    /// Non-success HTTP status: the upstream does not know the pair/currency.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { .. })
    }
}

pub type MarketResult<T> = std::result::Result<T, MarketError>;

/// Parse one of the decimal strings the exchange uses for numeric fields.
pub fn parse_decimal(field: &str, raw: &str) -> MarketResult<f64> {
    let v = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| MarketError::Malformed(format!("{field} is not a number: {raw:?}")))?;
    if !v.is_finite() {
        return Err(MarketError::Malformed(format!("{field} is not finite")));
    }
    Ok(v)
}
