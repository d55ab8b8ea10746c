//! News Relay — Binary Entrypoint
//! Polls the upstream news API on a fixed cadence and relays fresh
//! articles to a single Discord channel.

use anyhow::Context;
use tokio::sync::watch;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use news_relay::config::Config;
use news_relay::dispatch::{Dispatcher, DispatcherCfg};
use news_relay::ingest::newsapi::NewsApiSource;
use news_relay::notify::discord::DiscordSink;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("news_relay=info,dispatch=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when the vars come from the real
    // environment.
    let _ = dotenvy::dotenv();

    init_tracing();

    let config = Config::from_env().context("loading configuration")?;
    tracing::info!(
        channel_id = config.channel_id,
        interval_secs = config.interval_secs,
        queue_capacity = config.queue_capacity,
        domains = ?config.domains,
        "starting relay"
    );

    let source = NewsApiSource::new(config.news_api_key.clone(), &config.domains);
    let sink = DiscordSink::new(config.discord_token.clone(), config.channel_id);
    let dispatcher = Dispatcher::new(
        source,
        sink,
        DispatcherCfg {
            interval_secs: config.interval_secs,
            queue_capacity: config.queue_capacity,
        },
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let worker = tokio::spawn(dispatcher.run(shutdown_rx));

    tokio::signal::ctrl_c()
        .await
        .context("waiting for shutdown signal")?;
    tracing::info!("shutdown requested");
    let _ = shutdown_tx.send(true);
    worker.await.context("joining dispatcher task")?;

    Ok(())
}
