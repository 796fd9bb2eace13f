use anyhow::{bail, Context, Result};

const DEFAULT_FEED_LIMIT: usize = 20;
const DEFAULT_PORT: u16 = 8000;

/// Environment configuration for the service. Loading happens once at startup;
/// the pipeline itself only ever sees the constructed collaborators.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Telegram mirror host, e.g. https://tg.i-c-a.su
    pub feed_host: String,
    pub cache_url: String,
    pub cache_token: String,
    pub pushover_token: String,
    pub pushover_user: String,
    pub feed_limit: usize,
    pub port: u16,
}

fn required(name: &str) -> Result<String> {
    let value = std::env::var(name).with_context(|| format!("missing env var {name}"))?;
    let value = value.trim().to_string();
    if value.is_empty() {
        bail!("env var {name} is empty");
    }
    Ok(value)
}

impl MonitorConfig {
    pub fn from_env() -> Result<Self> {
        let feed_limit = match std::env::var("FEED_FETCH_LIMIT") {
            Ok(raw) => raw
                .trim()
                .parse()
                .context("FEED_FETCH_LIMIT must be a number")?,
            Err(_) => DEFAULT_FEED_LIMIT,
        };
        let port = match std::env::var("PORT") {
            Ok(raw) => raw.trim().parse().context("PORT must be a port number")?,
            Err(_) => DEFAULT_PORT,
        };

        Ok(Self {
            feed_host: required("TELEGRAM_ICA_HOST")?,
            cache_url: required("UPSTASH_REDIS_REST_URL")?,
            cache_token: required("UPSTASH_REDIS_REST_TOKEN")?,
            pushover_token: required("PUSHOVER_TOKEN")?,
            pushover_user: required("PUSHOVER_USER")?,
            feed_limit,
            port,
        })
    }
}
