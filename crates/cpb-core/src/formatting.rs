//! User-facing reply texts. Replies are plain text (no parse mode).

use crate::{broadcast::BroadcastSummary, market::PriceStats};

pub const WELCOME: &str = "👋 Welcome! Use /price BTC or /convert 2 ETH BTC\nSend /help for all commands.";

pub const PRICE_USAGE: &str = "Usage: /price BTC";
pub const CONVERT_USAGE: &str = "Usage: /convert 2 ETH BTC or /convert 1 ETH USD";
pub const BROADCAST_USAGE: &str = "Usage: /broadcast Your message here";

pub const INVALID_SYMBOL: &str = "❌ Invalid symbol";
pub const INVALID_AMOUNT: &str = "❌ Invalid amount";
pub const CONVERSION_FAILED: &str = "❌ Conversion failed";
pub const UPSTREAM_UNAVAILABLE: &str = "❌ Market data is unavailable right now. Please try again later.";
pub const NOT_ALLOWED: &str = "⛔ You are not allowed to use this command.";
pub const INTERNAL_ERROR: &str = "⚠️ Something went wrong. Please try again later.";
pub const UNKNOWN_COMMAND: &str = "🤔 Unknown command. Send /help to see what I can do.";

pub fn help_text(quote_asset: &str, fiat_currencies: &[String]) -> String {
    let fiats = fiat_currencies.join(", ");
    format!(
        "📋 Commands:\n\
/start - Register for announcements\n\
/help - Show this message\n\
/price SYMBOL - Live price + 24h stats (e.g. /price BTC)\n\
/convert AMOUNT FROM TO - Convert between coins or to fiat (e.g. /convert 2 ETH BTC)\n\n\
💡 Prices are quoted against {quote_asset}. Fiat targets: USD, {fiats}."
    )
}

/// Currency sign used in front of a fiat figure; unknown codes fall back to `CODE `.
pub fn fiat_sign(code: &str) -> String {
    match code {
        "USD" => "$".to_string(),
        "INR" => "₹".to_string(),
        "EUR" => "€".to_string(),
        "GBP" => "£".to_string(),
        "JPY" | "CNY" => "¥".to_string(),
        "KRW" => "₩".to_string(),
        other => format!("{other} "),
    }
}

/// `/price` reply. `fiat` is `None` when the forex lookup failed.
pub fn price_reply(
    symbol: &str,
    stats: &PriceStats,
    fiat_code: &str,
    fiat_price: Option<f64>,
) -> String {
    let fiat = match fiat_price {
        Some(v) => format!("{}{v:.2}", fiat_sign(fiat_code)),
        None => format!("{fiat_code} n/a"),
    };
    format!(
        "💰 {symbol}\n\
Price: ${:.2} | {fiat}\n\
24h: {:.2}%\n\
High: ${:.2} | Low: ${:.2}\n\
Volume: {:.2}",
        stats.price, stats.change_percent, stats.high, stats.low, stats.volume
    )
}

pub fn conversion_reply(amount: f64, from: &str, result: f64, to: &str) -> String {
    format!("🔄 {amount} {from} = {result:.6} {to}")
}

pub fn broadcast_summary(summary: &BroadcastSummary) -> String {
    format!(
        "✅ Sent to {} users, ❌ Failed {}",
        summary.delivered, summary.failed
    )
}

pub fn broadcast_too_long(max_len: usize) -> String {
    format!("{BROADCAST_USAGE}\n(message must be at most {max_len} characters)")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats() -> PriceStats {
        PriceStats {
            price: 50000.0,
            change_percent: 2.5,
            high: 51000.0,
            low: 49000.0,
            volume: 1000.0,
        }
    }

    #[test]
    fn price_reply_shows_usd_and_fiat() {
        let text = price_reply("BTC", &stats(), "INR", Some(4_150_000.0));
        assert!(text.contains("💰 BTC"));
        assert!(text.contains("Price: $50000.00 | ₹4150000.00"));
        assert!(text.contains("24h: 2.50%"));
        assert!(text.contains("High: $51000.00 | Low: $49000.00"));
        assert!(text.contains("Volume: 1000.00"));
    }

    #[test]
    fn price_reply_marks_missing_fiat() {
        let text = price_reply("BTC", &stats(), "INR", None);
        assert!(text.contains("INR n/a"));
        assert!(text.contains("$50000.00"));
    }

    #[test]
    fn conversion_reply_uses_six_decimals() {
        assert_eq!(
            conversion_reply(2.0, "ETH", 0.1, "BTC"),
            "🔄 2 ETH = 0.100000 BTC"
        );
    }

    #[test]
    fn unknown_fiat_sign_falls_back_to_code() {
        assert_eq!(fiat_sign("CHF"), "CHF ");
        assert_eq!(fiat_sign("INR"), "₹");
    }
}
