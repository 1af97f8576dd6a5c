//! Market data: exchange + forex ports and the conversion service built on them.

pub mod port;
pub mod service;
pub mod types;

pub use port::{ExchangePort, ForexPort};
pub use service::{ConversionTarget, MarketService};
pub use types::{MarketError, MarketResult, PriceStats};
