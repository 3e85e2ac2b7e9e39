//! Inbound Telegram updates
//!
//! A poller task long-polls `getUpdates` and feeds an unbounded channel; the
//! announcer consumes that stream and, whenever the bot is added to a group,
//! posts the group's chat id into it so operators can configure the webhook
//! URL.

use futures::{Stream, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::metrics;
use crate::telegram::{ChatKind, Messenger, OutgoingMessage, Update};
use crate::Result;

pub const DEFAULT_POLL_TIMEOUT_SECS: u64 = 60;

const RETRY_DELAY: Duration = Duration::from_secs(3);

/// Start receiving updates.
///
/// The first poll runs before this returns so that a bad token or an
/// unreachable API fails startup. Later poll errors are logged and retried.
pub async fn subscribe(
    messenger: Arc<dyn Messenger>,
    poll_timeout_secs: u64,
) -> Result<impl Stream<Item = Update>> {
    let first = messenger.get_updates(0, 0).await?;
    let (tx, rx) = mpsc::unbounded_channel();

    let mut offset = next_offset(0, &first);
    for update in first {
        // rx is still in scope, so this cannot fail.
        let _ = tx.send(update);
    }

    tokio::spawn(async move {
        loop {
            match messenger.get_updates(offset, poll_timeout_secs).await {
                Ok(updates) => {
                    offset = next_offset(offset, &updates);
                    for update in updates {
                        if tx.send(update).is_err() {
                            debug!("Update consumer dropped, stopping poller");
                            return;
                        }
                    }
                }
                Err(e) => {
                    warn!("Failed to get updates, retrying in {:?}: {}", RETRY_DELAY, e);
                    tokio::time::sleep(RETRY_DELAY).await;
                }
            }
            if tx.is_closed() {
                return;
            }
        }
    });

    Ok(futures::stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|update| (update, rx))
    }))
}

fn next_offset(current: i64, updates: &[Update]) -> i64 {
    updates
        .iter()
        .map(|u| u.update_id + 1)
        .fold(current, i64::max)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    Idle,
    /// The bot was just added to this group chat.
    Announcing(i64),
}

/// Tells group chats their own id when the bot joins them.
pub struct ChatIdAnnouncer {
    messenger: Arc<dyn Messenger>,
    bot_username: String,
}

impl ChatIdAnnouncer {
    pub fn new(messenger: Arc<dyn Messenger>, bot_username: impl Into<String>) -> Self {
        Self {
            messenger,
            bot_username: bot_username.into(),
        }
    }

    /// Where an update takes the listener from `Idle`.
    pub fn transition(&self, update: &Update) -> ListenerState {
        let Some(message) = &update.message else {
            return ListenerState::Idle;
        };
        if message.chat.kind != ChatKind::Group {
            return ListenerState::Idle;
        }
        let bot_added = message
            .added_members()
            .any(|member| member.username.as_deref() == Some(self.bot_username.as_str()));

        if bot_added {
            ListenerState::Announcing(message.chat.id)
        } else {
            ListenerState::Idle
        }
    }

    /// Handle one update; always ends back in `Idle`.
    pub async fn handle(&self, update: &Update) -> ListenerState {
        if let ListenerState::Announcing(chat_id) = self.transition(update) {
            info!("Added to group chat {}", chat_id);
            let notice = OutgoingMessage::plain(chat_id, announcement(chat_id));
            match self.messenger.send_message(&notice).await {
                Ok(_) => metrics::CHAT_ANNOUNCEMENTS_TOTAL.inc(),
                Err(e) => warn!("Failed to announce chat id to {}: {}", chat_id, e),
            }
        }
        ListenerState::Idle
    }

    /// Consume updates until the stream ends.
    pub async fn run<S>(self, updates: S)
    where
        S: Stream<Item = Update>,
    {
        futures::pin_mut!(updates);
        while let Some(update) = updates.next().await {
            self.handle(&update).await;
        }
        info!("Update stream closed");
    }
}

pub fn announcement(chat_id: i64) -> String {
    format!("Chat id is '{}'", chat_id)
}
