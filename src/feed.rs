use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Bounds for the per-fetch message count. Absurd caller requests are clamped
/// into this range rather than rejected.
const MIN_FETCH_LIMIT: usize = 10;
const MAX_FETCH_LIMIT: usize = 100;

/// One message from the monitored channel, normalized from the wire format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Unique within a channel only; cache keys must scope by channel.
    pub id: String,
    pub published_at: DateTime<Utc>,
    pub text: String,
    pub channel_title: String,
    pub link: String,
}

#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch the channel's most recent messages, newest-window bounded by
    /// `limit` (clamped by the implementation into a sane range).
    async fn recent_messages(&self, channel: &str, limit: usize) -> Result<Vec<Message>>;
}

pub fn clamp_limit(limit: usize) -> usize {
    limit.clamp(MIN_FETCH_LIMIT, MAX_FETCH_LIMIT)
}

// Wire model of the tg.i-c-a.su channel mirror.

#[derive(Debug, Deserialize)]
struct TelegramResponse {
    #[serde(default)]
    messages: Vec<TelegramMessage>,
    #[serde(default)]
    chats: Vec<TelegramChat>,
}

#[derive(Debug, Deserialize)]
struct TelegramChat {
    #[serde(default)]
    title: String,
    #[serde(default)]
    username: String,
}

#[derive(Debug, Deserialize)]
struct TelegramMessage {
    id: i64,
    /// Unix epoch seconds.
    date: i64,
    /// Absent on service messages; an empty text simply never matches.
    #[serde(default, rename = "message")]
    text: String,
}

/// Feed adapter for a Telegram channel mirror host (e.g. https://tg.i-c-a.su).
pub struct TelegramFeed {
    host: String,
    client: reqwest::Client,
}

impl TelegramFeed {
    pub fn new(host: String) -> Self {
        Self {
            host: host.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn convert(channel: &str, response: TelegramResponse) -> Vec<Message> {
        // The mirror lists the channel itself as the first chat entry; fall
        // back to the requested username when metadata is missing.
        let (title, username) = response
            .chats
            .first()
            .map(|c| (c.title.clone(), c.username.clone()))
            .unwrap_or_else(|| (channel.to_string(), channel.to_string()));
        let username = if username.is_empty() {
            channel.to_string()
        } else {
            username
        };

        response
            .messages
            .into_iter()
            .map(|m| Message {
                id: m.id.to_string(),
                published_at: DateTime::from_timestamp(m.date, 0).unwrap_or_default(),
                text: m.text,
                channel_title: title.clone(),
                link: format!("https://t.me/{}/{}", username, m.id),
            })
            .collect()
    }
}

#[async_trait]
impl FeedSource for TelegramFeed {
    async fn recent_messages(&self, channel: &str, limit: usize) -> Result<Vec<Message>> {
        let url = format!(
            "{}/json/{}?limit={}",
            self.host,
            channel,
            clamp_limit(limit)
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("requesting messages for channel {channel:?}"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!(
                "feed returned {status} for channel {channel:?}"
            ));
        }

        let parsed: TelegramResponse = response
            .json()
            .await
            .with_context(|| format!("decoding feed response for channel {channel:?}"))?;

        Ok(Self::convert(channel, parsed))
    }
}
