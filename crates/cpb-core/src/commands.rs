//! Command routing: one stateless handler per chat command.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::{
    broadcast::Broadcaster,
    config::Config,
    formatting,
    market::{ConversionTarget, MarketError, MarketService},
    messaging::types::Command,
    security::is_admin,
    user_store::UserStore,
};

/// What the transport layer should do with a routed command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Routed {
    /// Send this text back to the invoking chat.
    Reply(String),
    /// Authorized, non-empty broadcast. The caller runs it (possibly in the
    /// background) via `CommandRouter::run_broadcast`.
    Broadcast(String),
}

#[derive(Clone)]
pub struct CommandRouter {
    cfg: Arc<Config>,
    users: Arc<UserStore>,
    market: MarketService,
    broadcaster: Broadcaster,
}

impl CommandRouter {
    pub fn new(
        cfg: Arc<Config>,
        users: Arc<UserStore>,
        market: MarketService,
        broadcaster: Broadcaster,
    ) -> Self {
        Self {
            cfg,
            users,
            market,
            broadcaster,
        }
    }

    pub async fn route(&self, cmd: &Command) -> Routed {
        info!(
            chat_id = cmd.chat_id.0,
            user_id = cmd.user_id.map(|u| u.0),
            command = %cmd.name,
            "command received"
        );

        match cmd.name.as_str() {
            "start" => Routed::Reply(self.start(cmd).await),
            "help" => Routed::Reply(formatting::help_text(
                self.market.quote_asset(),
                &self.cfg.fiat_currencies,
            )),
            "price" => Routed::Reply(self.price(cmd).await),
            "convert" => Routed::Reply(self.convert(cmd).await),
            "broadcast" => self.broadcast(cmd),
            _ => Routed::Reply(formatting::UNKNOWN_COMMAND.to_string()),
        }
    }

    /// Route and, for broadcasts, run the dispatcher inline. Always yields the reply text.
    pub async fn handle(&self, cmd: &Command) -> String {
        match self.route(cmd).await {
            Routed::Reply(text) => text,
            Routed::Broadcast(text) => self.run_broadcast(&text).await,
        }
    }

    /// Run the Broadcast Dispatcher and format its summary for the admin.
    pub async fn run_broadcast(&self, text: &str) -> String {
        match self.broadcaster.run(text).await {
            Ok(summary) => formatting::broadcast_summary(&summary),
            Err(e) => {
                error!(error = %e, "broadcast aborted: cannot read user store");
                formatting::INTERNAL_ERROR.to_string()
            }
        }
    }

    async fn start(&self, cmd: &Command) -> String {
        match self.users.save_user(cmd.chat_id).await {
            Ok(true) => info!(chat_id = cmd.chat_id.0, "new user registered"),
            Ok(false) => {}
            Err(e) => {
                error!(chat_id = cmd.chat_id.0, error = %e, "failed to register user");
                return formatting::INTERNAL_ERROR.to_string();
            }
        }
        formatting::WELCOME.to_string()
    }

    async fn price(&self, cmd: &Command) -> String {
        let [symbol] = cmd.args.as_slice() else {
            return formatting::PRICE_USAGE.to_string();
        };
        let symbol = symbol.to_uppercase();

        let stats = match self.market.get_price_stats(&symbol).await {
            Ok(stats) => stats,
            Err(MarketError::InvalidSymbol(_)) => return formatting::INVALID_SYMBOL.to_string(),
            Err(e) if e.is_not_found() => return formatting::INVALID_SYMBOL.to_string(),
            Err(e) => {
                warn!(%symbol, error = %e, "price lookup failed");
                return formatting::UPSTREAM_UNAVAILABLE.to_string();
            }
        };

        let fiat = self.cfg.primary_fiat();
        let fiat_price = match self.market.fiat_rate(fiat).await {
            Ok(rate) => Some(stats.price * rate),
            Err(e) => {
                warn!(currency = fiat, error = %e, "forex lookup failed");
                None
            }
        };

        formatting::price_reply(&symbol, &stats, fiat, fiat_price)
    }

    async fn convert(&self, cmd: &Command) -> String {
        let [amount, from, to, ..] = cmd.args.as_slice() else {
            return formatting::CONVERT_USAGE.to_string();
        };

        let Some(amount) = parse_amount(amount) else {
            return formatting::INVALID_AMOUNT.to_string();
        };
        let from = from.to_uppercase();
        let target = ConversionTarget::classify(&to.to_uppercase(), &self.cfg.fiat_currencies);

        match self.market.convert_to(amount, &from, &target).await {
            Ok(result) => formatting::conversion_reply(amount, &from, result, target.code()),
            Err(e) => {
                warn!(%from, to = target.code(), error = %e, "conversion failed");
                formatting::CONVERSION_FAILED.to_string()
            }
        }
    }

    fn broadcast(&self, cmd: &Command) -> Routed {
        if !is_admin(cmd.user_id, self.cfg.admin_user_id) {
            warn!(
                chat_id = cmd.chat_id.0,
                user_id = cmd.user_id.map(|u| u.0),
                "unauthorized broadcast attempt"
            );
            return Routed::Reply(formatting::NOT_ALLOWED.to_string());
        }

        let body = cmd.raw_args.trim();
        if body.is_empty() {
            return Routed::Reply(formatting::BROADCAST_USAGE.to_string());
        }

        let max_len = self.broadcaster.max_message_len();
        if body.chars().count() > max_len {
            return Routed::Reply(formatting::broadcast_too_long(max_len));
        }

        Routed::Broadcast(body.to_string())
    }
}

/// Non-negative finite amount, or `None` for anything a user could mistype.
fn parse_amount(raw: &str) -> Option<f64> {
    let v = raw.trim().parse::<f64>().ok()?;
    if v.is_finite() && v >= 0.0 {
        Some(v)
    } else {
        None
    }
}
