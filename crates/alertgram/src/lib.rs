pub mod alerts;
pub mod compose;
pub mod config;
pub mod delivery;
pub mod listener;
pub mod metrics;
pub mod server;
pub mod telegram;
pub mod template;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),
    #[error("YAML error: {0}")]
    SerdeYaml(#[from] serde_yaml::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
    #[error("Telegram API error {code}: {description}")]
    Telegram { code: i64, description: String },
    #[error("Template error: {0}")]
    Template(String),
    #[error("Invalid chat id {0:?}")]
    InvalidChatId(String),
}

pub type Result<T> = std::result::Result<T, Error>;
