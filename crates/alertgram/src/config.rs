use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::listener::DEFAULT_POLL_TIMEOUT_SECS;
use crate::telegram::DEFAULT_API_BASE;
use crate::{Error, Result};

const DEFAULT_LISTEN_ADDR: &str = ":9087";

#[derive(Debug, Clone, Parser)]
#[command(name = "alertgram", version, about = "Relays Alertmanager webhooks into Telegram chats")]
pub struct Cli {
    /// Path to a config file
    #[arg(short = 'c', long = "config", default_value = "config.yaml")]
    pub config: PathBuf,

    /// Listen address
    #[arg(short = 'l', long = "listen")]
    pub listen: Option<String>,

    /// Template file
    #[arg(short = 't', long = "template")]
    pub template: Option<PathBuf>,
}

/// On-disk configuration, flat YAML keys.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub telegram_token: Option<String>,
    #[serde(default)]
    pub listen_addr: Option<String>,
    #[serde(default)]
    pub template_path: Option<PathBuf>,
    #[serde(default)]
    pub telegram_api_base: Option<String>,
    #[serde(default)]
    pub poll_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub telegram: TelegramConfig,
    pub template_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub addr: String,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(skip_serializing)]
    pub token: String,
    pub api_base: String,
    pub poll_timeout_secs: u64,
}

// The token never goes to logs.
impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("token", &"***")
            .field("api_base", &self.api_base)
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .finish()
    }
}

impl Config {
    /// File, then `.env` and the environment, then command line flags.
    pub fn load(cli: &Cli) -> Result<Self> {
        // Load environment variables from .env file if it exists
        let _ = dotenvy::dotenv();

        let file = FileConfig::read(&cli.config)?;
        Self::resolve(file, cli, |key| std::env::var(key).ok())
    }

    fn resolve(
        file: FileConfig,
        cli: &Cli,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let token = env("TELEGRAM_TOKEN")
            .or(file.telegram_token)
            .unwrap_or_default();
        if token.trim().is_empty() {
            return Err(Error::Config(
                "telegram_token must be set in the config file or TELEGRAM_TOKEN".to_string(),
            ));
        }

        let listen = cli
            .listen
            .clone()
            .or_else(|| env("LISTEN_ADDR"))
            .or(file.listen_addr)
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());

        let template_path = cli
            .template
            .clone()
            .or_else(|| env("TEMPLATE_PATH").map(PathBuf::from))
            .or(file.template_path)
            .filter(|p| !p.as_os_str().is_empty());

        Ok(Config {
            server: ServerConfig {
                addr: normalize_listen_addr(&listen),
            },
            telegram: TelegramConfig {
                token: token.trim().to_string(),
                api_base: env("TELEGRAM_API_BASE")
                    .or(file.telegram_api_base)
                    .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
                poll_timeout_secs: file
                    .poll_timeout_secs
                    .unwrap_or(DEFAULT_POLL_TIMEOUT_SECS),
            },
            template_path,
        })
    }
}

impl FileConfig {
    /// A missing file yields an empty config; the token may still come
    /// from the environment.
    pub fn read(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(serde_yaml::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Config file {} not found, using environment only", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// `:9087` means every interface, as it does for Go listeners.
pub fn normalize_listen_addr(addr: &str) -> String {
    if addr.starts_with(':') {
        format!("0.0.0.0{}", addr)
    } else {
        addr.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("alertgram").chain(args.iter().copied()))
    }

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_file_values_and_defaults() {
        let file: FileConfig = serde_yaml::from_str("telegram_token: \"123:abc\"\n").unwrap();
        let config = Config::resolve(file, &cli(&[]), env(&[])).unwrap();

        assert_eq!(config.telegram.token, "123:abc");
        assert_eq!(config.server.addr, "0.0.0.0:9087");
        assert_eq!(config.telegram.api_base, DEFAULT_API_BASE);
        assert_eq!(config.telegram.poll_timeout_secs, 60);
        assert!(config.template_path.is_none());
    }

    #[test]
    fn test_precedence() {
        let file = FileConfig {
            telegram_token: Some("file-token".to_string()),
            listen_addr: Some("127.0.0.1:1".to_string()),
            template_path: Some(PathBuf::from("file.tmpl")),
            ..Default::default()
        };
        let config = Config::resolve(
            file,
            &cli(&["-l", ":8080"]),
            env(&[
                ("TELEGRAM_TOKEN", "env-token"),
                ("LISTEN_ADDR", "127.0.0.1:2"),
                ("TEMPLATE_PATH", "env.tmpl"),
            ]),
        )
        .unwrap();

        assert_eq!(config.telegram.token, "env-token");
        assert_eq!(config.server.addr, "0.0.0.0:8080");
        assert_eq!(config.template_path, Some(PathBuf::from("env.tmpl")));
    }

    #[test]
    fn test_debug_hides_token() {
        let file = FileConfig {
            telegram_token: Some("123:SUPERSECRET".to_string()),
            ..Default::default()
        };
        let config = Config::resolve(file, &cli(&[]), env(&[])).unwrap();
        let printed = format!("{:?}", config);
        assert!(!printed.contains("SUPERSECRET"));
        assert!(printed.contains("api_base"));
    }

    #[test]
    fn test_missing_token() {
        let err = Config::resolve(FileConfig::default(), &cli(&[]), env(&[])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_missing_file_is_empty() {
        let file = FileConfig::read(Path::new("/nonexistent/alertgram.yaml")).unwrap();
        assert!(file.telegram_token.is_none());
    }

    #[test]
    fn test_normalize_listen_addr() {
        assert_eq!(normalize_listen_addr(":9087"), "0.0.0.0:9087");
        assert_eq!(normalize_listen_addr("127.0.0.1:9087"), "127.0.0.1:9087");
    }
}
