use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use alertgram::{
    compose::Composer,
    config::{Cli, Config},
    listener::{self, ChatIdAnnouncer},
    server::Server,
    telegram::{Messenger, TelegramClient},
    template::MessageTemplate,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli).context("Problem loading configuration")?;
    info!("Loaded configuration: {:?}", config);

    let template = match &config.template_path {
        Some(path) => {
            let template = MessageTemplate::from_file(path)
                .with_context(|| format!("Problem parsing template file {}", path.display()))?;
            info!("Using message template {}", path.display());
            Some(Arc::new(template))
        }
        None => None,
    };

    let client = TelegramClient::new(&config.telegram.api_base, &config.telegram.token)?;
    let messenger: Arc<dyn Messenger> = Arc::new(client);

    let me = messenger
        .get_me()
        .await
        .context("Telegram bot authorization failed")?;
    let username = me.username.unwrap_or_default();
    info!("Authorized on account {}", username);

    let updates = listener::subscribe(messenger.clone(), config.telegram.poll_timeout_secs)
        .await
        .context("Failed to start Telegram update listener")?;
    let announcer = ChatIdAnnouncer::new(messenger.clone(), username);
    tokio::spawn(async move {
        announcer.run(updates).await;
        error!("Telegram update listener stopped");
    });

    let server = Server::new(Composer::new(template), messenger);
    info!("Starting server on {}", config.server.addr);
    server.start(&config.server.addr).await?;

    Ok(())
}
