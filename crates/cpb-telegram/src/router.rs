use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};
use tracing::{info, warn};

use cpb_core::{
    broadcast::Broadcaster, commands::CommandRouter, config::Config, market::MarketService,
    messaging::port::MessagingPort, user_store::UserStore,
};

use crate::handlers;
use crate::TelegramMessenger;

#[derive(Clone)]
pub struct AppState {
    pub router: CommandRouter,
    pub messenger: Arc<dyn MessagingPort>,
    /// Our `@username`; commands mentioning another bot are ignored.
    pub bot_username: Option<String>,
}

impl AppState {
    pub fn new(
        cfg: Arc<Config>,
        market: MarketService,
        messenger: Arc<dyn MessagingPort>,
        bot_username: Option<String>,
    ) -> Self {
        let users = Arc::new(UserStore::new(cfg.users_file.clone()));
        let broadcaster = Broadcaster::new(users.clone(), messenger.clone());
        let router = CommandRouter::new(cfg, users, market, broadcaster);
        Self {
            router,
            messenger,
            bot_username,
        }
    }
}

pub async fn run_polling(cfg: Arc<Config>, market: MarketService) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    let bot_username = match bot.get_me().await {
        Ok(me) => {
            info!("cpb started: @{}", me.username());
            Some(me.username().to_string())
        }
        Err(e) => {
            warn!(error = %e, "getMe failed; accepting commands addressed to any bot");
            None
        }
    };
    info!(
        users_file = %cfg.users_file.display(),
        quote = %cfg.quote_asset,
        fiat = ?cfg.fiat_currencies,
        "configuration loaded"
    );

    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let state = Arc::new(AppState::new(cfg, market, messenger, bot_username));

    let handler = dptree::entry().branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .build()
        .dispatch()
        .await;

    info!("dispatcher stopped");
    Ok(())
}
