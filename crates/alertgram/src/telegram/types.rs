use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseMode {
    #[serde(rename = "HTML")]
    Html,
}

/// Body of a `sendMessage` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutgoingMessage {
    pub chat_id: i64,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<ParseMode>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub disable_web_page_preview: bool,
}

impl OutgoingMessage {
    /// Plain text, link previews left on.
    pub fn plain(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            parse_mode: None,
            disable_web_page_preview: false,
        }
    }
}

/// What the platform hands back for a delivered message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub date: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotUser {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatKind {
    Private,
    Group,
    Supergroup,
    Channel,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: ChatKind,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IncomingMessage {
    pub chat: Chat,
    #[serde(default)]
    pub new_chat_members: Vec<BotUser>,
    /// Legacy single-member field, still sent alongside `new_chat_members`.
    #[serde(default)]
    pub new_chat_member: Option<BotUser>,
}

impl IncomingMessage {
    pub fn added_members(&self) -> impl Iterator<Item = &BotUser> {
        self.new_chat_members
            .iter()
            .chain(self.new_chat_member.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<IncomingMessage>,
}

/// Decodes a `getUpdates` batch one entry at a time. An entry of an
/// unexpected shape keeps its `update_id` (so the offset still moves past
/// it) and loses its message; entries without an id are dropped.
pub(crate) fn decode_updates(raw: Vec<serde_json::Value>) -> Vec<Update> {
    raw.into_iter()
        .filter_map(|value| {
            let update_id = value.get("update_id").and_then(serde_json::Value::as_i64);
            match serde_json::from_value::<Update>(value) {
                Ok(update) => Some(update),
                Err(e) => {
                    warn!("Skipping undecodable update {:?}: {}", update_id, e);
                    update_id.map(|update_id| Update {
                        update_id,
                        message: None,
                    })
                }
            }
        })
        .collect()
}

/// Envelope around every Bot API response.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub error_code: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
}
