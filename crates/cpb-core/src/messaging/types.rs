use crate::domain::{ChatId, UserId};

/// Cross-messenger inbound command.
///
/// Telegram-specific fields stay in the Telegram adapter.
#[derive(Clone, Debug)]
pub struct Command {
    pub chat_id: ChatId,
    /// `None` for messages without a sender (e.g. channel posts).
    pub user_id: Option<UserId>,
    /// Lower-cased command name without the leading `/` or `@botname` suffix.
    pub name: String,
    /// Positional arguments (whitespace separated).
    pub args: Vec<String>,
    /// Everything after the command token, line breaks preserved.
    pub raw_args: String,
}

impl Command {
    /// Parse raw message text like `/convert@my_bot 2 eth btc`.
    ///
    /// Returns `None` when the text is not a command, or when it is addressed
    /// to a bot other than `bot_username` (group chats with several bots).
    pub fn parse(
        chat_id: ChatId,
        user_id: Option<UserId>,
        bot_username: Option<&str>,
        text: &str,
    ) -> Option<Self> {
        let text = text.trim();
        let (first, rest) = match text.split_once(char::is_whitespace) {
            Some((first, rest)) => (first, rest.trim()),
            None => (text, ""),
        };
        let first = first.strip_prefix('/')?;

        let (name, mention) = match first.split_once('@') {
            Some((name, mention)) => (name, Some(mention)),
            None => (first, None),
        };
        if name.is_empty() {
            return None;
        }
        if let (Some(mention), Some(me)) = (mention, bot_username) {
            if !mention.eq_ignore_ascii_case(me.trim_start_matches('@')) {
                return None;
            }
        }

        Some(Self {
            chat_id,
            user_id,
            name: name.to_lowercase(),
            args: rest.split_whitespace().map(str::to_string).collect(),
            raw_args: rest.to_string(),
        })
    }
}

/// Capabilities / feature flags of a messenger implementation.
#[derive(Clone, Copy, Debug)]
pub struct MessagingCapabilities {
    pub max_message_len: usize,
}
