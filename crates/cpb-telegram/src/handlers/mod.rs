//! Telegram update handlers.
//!
//! Only text commands are handled; everything else is ignored.

use std::sync::Arc;

use teloxide::prelude::*;

use crate::router::AppState;

mod commands;

pub async fn handle_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    if !text.starts_with('/') {
        return Ok(());
    }

    commands::handle_command(msg, state).await
}
