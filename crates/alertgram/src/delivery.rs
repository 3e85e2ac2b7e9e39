use thiserror::Error;
use tracing::{error, info, warn};

use crate::compose::ComposedMessage;
use crate::metrics;
use crate::telegram::{Messenger, OutgoingMessage, Receipt};

pub const FALLBACK_NOTICE: &str = "Error sending message, check logs";

/// A failed send, with the text that was rejected.
#[derive(Debug, Error)]
#[error("{reason}")]
pub struct DeliveryError {
    pub reason: String,
    pub source_text: String,
}

/// Sends `message` to `chat_id`. Exactly one attempt is made.
///
/// When it fails a short plain notice is sent to the same chat so people
/// watching it know something was lost. The notice's own outcome is only
/// logged.
pub async fn deliver(
    messenger: &dyn Messenger,
    chat_id: i64,
    message: &ComposedMessage,
) -> Result<Receipt, DeliveryError> {
    match messenger.send_message(&message.to_outgoing(chat_id)).await {
        Ok(receipt) => {
            info!("Delivered message {} to chat {}", receipt.message_id, chat_id);
            metrics::MESSAGES_DELIVERED_TOTAL.inc();
            Ok(receipt)
        }
        Err(e) => {
            error!("Error sending message to chat {}: {}", chat_id, e);
            metrics::DELIVERY_FAILURES_TOTAL.inc();

            let notice = OutgoingMessage::plain(chat_id, FALLBACK_NOTICE);
            if let Err(notice_err) = messenger.send_message(&notice).await {
                warn!("Fallback notice to chat {} failed: {}", chat_id, notice_err);
            }

            Err(DeliveryError {
                reason: e.to_string(),
                source_text: message.text.clone(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telegram::{Chat, ChatKind, MockMessenger, ParseMode};
    use crate::Error;
    use mockall::Sequence;

    fn receipt(chat_id: i64) -> Receipt {
        Receipt {
            message_id: 1,
            chat: Chat {
                id: chat_id,
                kind: ChatKind::Group,
            },
            date: 0,
        }
    }

    #[tokio::test]
    async fn test_deliver_success_sends_once() {
        let mut messenger = MockMessenger::new();
        messenger
            .expect_send_message()
            .withf(|m| {
                m.chat_id == -42
                    && m.text == "hello"
                    && m.parse_mode == Some(ParseMode::Html)
                    && m.disable_web_page_preview
            })
            .times(1)
            .returning(|m| Ok(receipt(m.chat_id)));

        let message = ComposedMessage::html("hello".to_string());
        let receipt = tokio_test::assert_ok!(deliver(&messenger, -42, &message).await);
        assert_eq!(receipt.chat.id, -42);
    }

    #[tokio::test]
    async fn test_deliver_failure_reports_text_and_sends_notice_once() {
        let mut messenger = MockMessenger::new();
        let mut seq = Sequence::new();
        messenger
            .expect_send_message()
            .withf(|m| m.text == "<b>broken")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Err(Error::Telegram {
                    code: 400,
                    description: "Bad Request: can't parse entities".to_string(),
                })
            });
        messenger
            .expect_send_message()
            .withf(|m| m.text == FALLBACK_NOTICE && m.parse_mode.is_none())
            .times(1)
            .in_sequence(&mut seq)
            .returning(|m| Ok(receipt(m.chat_id)));

        let message = ComposedMessage::html("<b>broken".to_string());
        let err = tokio_test::assert_err!(deliver(&messenger, 7, &message).await);
        assert_eq!(err.source_text, "<b>broken");
        assert!(err.reason.contains("can't parse entities"));
    }

    #[tokio::test]
    async fn test_notice_failure_is_swallowed() {
        let mut messenger = MockMessenger::new();
        messenger
            .expect_send_message()
            .times(2)
            .returning(|_| {
                Err(Error::Telegram {
                    code: 403,
                    description: "Forbidden: bot was kicked".to_string(),
                })
            });

        let message = ComposedMessage::html("x".to_string());
        let err = deliver(&messenger, 7, &message).await.unwrap_err();
        assert!(err.reason.contains("bot was kicked"));
        assert_eq!(err.source_text, "x");
    }
}
