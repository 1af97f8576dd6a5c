use std::sync::Arc;

use teloxide::prelude::*;
use tracing::{error, info};

use cpb_core::{
    commands::Routed,
    domain::{ChatId, UserId},
    messaging::types::Command,
};

use crate::router::AppState;

/// Convert a Telegram message into a core `Command`.
///
/// `bot_username` is our own `@username`, used to drop `/cmd@otherbot`.
pub(crate) fn to_command(msg: &Message, bot_username: Option<&str>) -> Option<Command> {
    let text = msg.text()?;
    Command::parse(
        ChatId(msg.chat.id.0),
        msg.from().map(|u| UserId(u.id.0 as i64)),
        bot_username,
        text,
    )
}

pub async fn handle_command(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(cmd) = to_command(&msg, state.bot_username.as_deref()) else {
        return Ok(());
    };

    match state.router.route(&cmd).await {
        Routed::Reply(text) => reply(&state, cmd.chat_id, &text).await,
        Routed::Broadcast(text) => {
            // Runs outside the per-chat update queue so the admin's chat stays responsive.
            let state = state.clone();
            let chat_id = cmd.chat_id;
            tokio::spawn(async move {
                info!(chat_id = chat_id.0, "broadcast job spawned");
                let summary = state.router.run_broadcast(&text).await;
                reply(&state, chat_id, &summary).await;
            });
        }
    }

    Ok(())
}

async fn reply(state: &AppState, chat_id: ChatId, text: &str) {
    if let Err(e) = state.messenger.send_text(chat_id, text).await {
        error!(chat_id = chat_id.0, error = %e, "failed to send reply");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(text: &str, with_sender: bool) -> Message {
        let mut v = serde_json::json!({
            "message_id": 10,
            "date": 1_760_000_000,
            "chat": { "id": -100123, "type": "group", "title": "prices" },
            "text": text,
        });
        if with_sender {
            v["from"] = serde_json::json!({
                "id": 42,
                "is_bot": false,
                "first_name": "Sam",
                "username": "sam"
            });
        }
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn maps_telegram_message_to_command() {
        let cmd = to_command(&message("/convert@price_bot 2 eth btc", true), Some("price_bot"))
            .unwrap();
        assert_eq!(cmd.chat_id, ChatId(-100123));
        assert_eq!(cmd.user_id, Some(UserId(42)));
        assert_eq!(cmd.name, "convert");
        assert_eq!(cmd.args, vec!["2", "eth", "btc"]);
    }

    #[test]
    fn message_without_sender_has_no_user() {
        let cmd = to_command(&message("/broadcast hi", false), Some("price_bot")).unwrap();
        assert_eq!(cmd.user_id, None);
    }

    #[test]
    fn plain_text_is_not_routed() {
        assert!(to_command(&message("hello there", true), Some("price_bot")).is_none());
    }

    #[test]
    fn command_for_another_bot_is_not_routed() {
        assert!(to_command(&message("/start@other_bot", true), Some("price_bot")).is_none());
        assert!(to_command(&message("/start", true), Some("price_bot")).is_some());
    }
}
