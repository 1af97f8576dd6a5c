use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{domain::UserId, errors::Error, Result};

pub const DEFAULT_MARKET_API_URL: &str = "https://api.binance.com/api/v3";
pub const DEFAULT_FOREX_API_URL: &str = "https://api.exchangerate.host";

/// Typed configuration for the bot.
#[derive(Clone, Debug)]
pub struct Config {
    // Telegram
    pub telegram_bot_token: String,
    pub admin_user_id: UserId,

    // Storage
    pub users_file: PathBuf,

    // Market data
    pub market_api_url: String,
    pub forex_api_url: String,
    pub forex_api_key: Option<String>,
    pub quote_asset: String,
    /// Fiat codes accepted by `/convert`. The first one is shown by `/price`.
    pub fiat_currencies: Vec<String>,
    pub http_timeout: Duration,
}

impl Config {
    /// Load from the process environment, after applying `.env` if present.
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).and_then(non_empty);

        let telegram_bot_token = var("TELEGRAM_BOT_TOKEN").ok_or_else(|| {
            Error::Config("TELEGRAM_BOT_TOKEN environment variable is required".to_string())
        })?;

        let admin_raw = var("TELEGRAM_ADMIN_ID").ok_or_else(|| {
            Error::Config("TELEGRAM_ADMIN_ID environment variable is required".to_string())
        })?;
        let admin_user_id = admin_raw
            .trim()
            .parse::<i64>()
            .map(UserId)
            .map_err(|_| Error::Config(format!("TELEGRAM_ADMIN_ID is not numeric: {admin_raw}")))?;

        let users_file = PathBuf::from(var("USERS_FILE").unwrap_or("users.txt".to_string()));

        let market_api_url = trim_base_url(
            var("MARKET_API_URL").unwrap_or(DEFAULT_MARKET_API_URL.to_string()),
        );
        let forex_api_url =
            trim_base_url(var("FOREX_API_URL").unwrap_or(DEFAULT_FOREX_API_URL.to_string()));
        let forex_api_key = var("FOREX_API_KEY");

        let quote_asset = var("QUOTE_ASSET")
            .unwrap_or("USDT".to_string())
            .trim()
            .to_uppercase();

        let mut fiat_currencies = parse_csv_upper(var("FIAT_CURRENCIES"));
        // USD is always served through the stablecoin pair, never the forex API.
        fiat_currencies.retain(|c| c != "USD");
        if fiat_currencies.is_empty() {
            fiat_currencies.push("INR".to_string());
        }

        let http_timeout = Duration::from_millis(
            var("HTTP_TIMEOUT_MS")
                .and_then(|s| s.trim().parse::<u64>().ok())
                .unwrap_or(10_000),
        );

        Ok(Self {
            telegram_bot_token,
            admin_user_id,
            users_file,
            market_api_url,
            forex_api_url,
            forex_api_key,
            quote_asset,
            fiat_currencies,
            http_timeout,
        })
    }

    /// Fiat currency displayed next to the USD price by `/price`.
    pub fn primary_fiat(&self) -> &str {
        self.fiat_currencies
            .first()
            .map(String::as_str)
            .unwrap_or("INR")
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        env::set_var(key, val);
    }
}

fn parse_csv_upper(v: Option<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in v.unwrap_or_default().split(',') {
        let code = item.trim().to_uppercase();
        if !code.is_empty() && !out.contains(&code) {
            out.push(code);
        }
    }
    out
}

fn trim_base_url(s: String) -> String {
    s.trim().trim_end_matches('/').to_string()
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
