//! Deals Monitor — Binary Entrypoint
//! Boots the Axum HTTP trigger, wiring config, collaborators and tracing.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use deals_monitor::api::{self, AppState};
use deals_monitor::cache::UpstashCache;
use deals_monitor::config::MonitorConfig;
use deals_monitor::feed::TelegramFeed;
use deals_monitor::monitor::DealsMonitor;
use deals_monitor::notify::PushoverNotifier;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("deals_monitor=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when the file is absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = MonitorConfig::from_env()?;

    let monitor = DealsMonitor::new(
        Arc::new(TelegramFeed::new(config.feed_host.clone())),
        Arc::new(UpstashCache::new(
            config.cache_url.clone(),
            config.cache_token.clone(),
        )),
        Arc::new(PushoverNotifier::new(
            config.pushover_token.clone(),
            config.pushover_user.clone(),
        )),
        config.feed_limit,
    );

    let app = api::router(AppState {
        monitor: Arc::new(monitor),
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(%addr, "deals monitor listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
