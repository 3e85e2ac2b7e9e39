use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::types::{decode_updates, ApiResponse, BotUser, OutgoingMessage, Receipt, Update};
use super::Messenger;
use crate::{Error, Result};

pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Slack on top of the long-poll timeout before the HTTP request gives up.
const POLL_GRACE: Duration = Duration::from_secs(10);

/// Bot API client over `reqwest`.
#[derive(Clone)]
pub struct TelegramClient {
    base: Url,
    client: reqwest::Client,
}

impl TelegramClient {
    pub fn new(api_base: &str, token: &str) -> Result<Self> {
        if token.is_empty() {
            return Err(Error::Config("Telegram token is empty".to_string()));
        }
        let base = Url::parse(&format!(
            "{}/bot{}/",
            api_base.trim_end_matches('/'),
            token
        ))?;
        Ok(Self {
            base,
            client: reqwest::Client::new(),
        })
    }

    async fn call<B, T>(&self, method: &str, body: &B, timeout: Option<Duration>) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.base.join(method)?;
        let mut request = self.client.post(url).json(body);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        // The Bot API reports failures in the JSON envelope, also on 4xx.
        // Request URLs carry the token, so they are stripped from errors.
        let response: ApiResponse<T> = request
            .send()
            .await
            .map_err(reqwest::Error::without_url)?
            .json()
            .await
            .map_err(reqwest::Error::without_url)?;
        match response {
            ApiResponse {
                ok: true,
                result: Some(result),
                ..
            } => Ok(result),
            ApiResponse {
                error_code,
                description,
                ..
            } => Err(Error::Telegram {
                code: error_code.unwrap_or_default(),
                description: description.unwrap_or_else(|| format!("{} failed", method)),
            }),
        }
    }
}

#[async_trait]
impl Messenger for TelegramClient {
    async fn send_message(&self, message: &OutgoingMessage) -> Result<Receipt> {
        debug!("sendMessage to chat {}", message.chat_id);
        self.call("sendMessage", message, None).await
    }

    async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>> {
        let body = json!({
            "offset": offset,
            "timeout": timeout_secs,
            "allowed_updates": ["message"],
        });
        let timeout = Duration::from_secs(timeout_secs) + POLL_GRACE;
        let raw: Vec<serde_json::Value> = self.call("getUpdates", &body, Some(timeout)).await?;
        Ok(decode_updates(raw))
    }

    async fn get_me(&self) -> Result<BotUser> {
        self.call("getMe", &json!({}), None).await
    }
}
