use std::sync::Arc;

use tracing::{info, warn};

use crate::{domain::ChatId, messaging::port::MessagingPort, user_store::UserStore, Result};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BroadcastSummary {
    pub attempted: usize,
    pub delivered: usize,
    pub failed: usize,
}

/// Sends one admin message to every registered chat.
///
/// Recipients are processed one at a time in storage order. A failed send is
/// counted and logged; it never stops the remaining sends.
#[derive(Clone)]
pub struct Broadcaster {
    users: Arc<UserStore>,
    messenger: Arc<dyn MessagingPort>,
}

impl Broadcaster {
    pub fn new(users: Arc<UserStore>, messenger: Arc<dyn MessagingPort>) -> Self {
        Self { users, messenger }
    }

    pub fn max_message_len(&self) -> usize {
        self.messenger.capabilities().max_message_len
    }

    /// Broadcast to everyone in the user store.
    ///
    /// Only reading the store can fail; per-recipient errors end up in the summary.
    pub async fn run(&self, text: &str) -> Result<BroadcastSummary> {
        let recipients = self.users.get_users().await?;
        info!(recipients = recipients.len(), "broadcast started");
        let summary = self.send_all(&recipients, text).await;
        info!(
            delivered = summary.delivered,
            failed = summary.failed,
            "broadcast finished"
        );
        Ok(summary)
    }

    pub async fn send_all(&self, recipients: &[ChatId], text: &str) -> BroadcastSummary {
        let mut summary = BroadcastSummary::default();
        for &chat_id in recipients {
            summary.attempted += 1;
            match self.messenger.send_text(chat_id, text).await {
                Ok(_) => summary.delivered += 1,
                Err(e) => {
                    warn!(chat_id = chat_id.0, error = %e, "broadcast send failed");
                    summary.failed += 1;
                }
            }
        }
        summary
    }
}
