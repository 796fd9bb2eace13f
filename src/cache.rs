use std::collections::HashSet;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

const KEY_NAMESPACE: &str = "deals_monitor";
const KEY_TTL_SECS: u64 = 24 * 60 * 60;

/// Per-channel, per-UTC-day record of already-processed message ids.
///
/// The day boundary is the UTC calendar date at call time, so a run straddling
/// midnight may snapshot one day's set and commit to the next day's key. That
/// is accepted; the set for the new day simply starts empty.
#[async_trait]
pub trait SeenCache: Send + Sync {
    /// Ids already committed for this channel today. An absent key is an empty
    /// set, not an error.
    async fn snapshot(&self, channel: &str) -> Result<HashSet<String>>;

    /// Append `ids` to today's set and reset its expiry to 24h from now.
    /// Callers skip the call entirely for empty batches.
    async fn commit(&self, channel: &str, ids: &[String]) -> Result<()>;
}

fn cache_key(channel: &str, day: NaiveDate) -> String {
    format!("{}:{}:{}", KEY_NAMESPACE, day.format("%Y%m%d"), channel)
}

pub fn today_key(channel: &str) -> String {
    cache_key(channel, Utc::now().date_naive())
}

#[derive(Debug, Deserialize)]
struct PipelineReply {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

/// Upstash Redis adapter over its REST API.
///
/// Commands go through the `/pipeline` endpoint as JSON command arrays with a
/// bearer token; each reply element carries either `result` or `error`.
pub struct UpstashCache {
    base_url: String,
    token: String,
    client: reqwest::Client,
}

impl UpstashCache {
    pub fn new(base_url: String, token: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            client: reqwest::Client::new(),
        }
    }

    async fn pipeline(&self, commands: Value) -> Result<Vec<PipelineReply>> {
        let response = self
            .client
            .post(format!("{}/pipeline", self.base_url))
            .bearer_auth(&self.token)
            .json(&commands)
            .send()
            .await
            .context("sending cache pipeline request")?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("cache store returned {status}"));
        }

        let replies: Vec<PipelineReply> = response
            .json()
            .await
            .context("decoding cache pipeline response")?;

        for reply in &replies {
            if let Some(err) = &reply.error {
                return Err(anyhow!("cache command failed: {err}"));
            }
        }
        Ok(replies)
    }
}

#[async_trait]
impl SeenCache for UpstashCache {
    async fn snapshot(&self, channel: &str) -> Result<HashSet<String>> {
        let key = today_key(channel);
        let replies = self
            .pipeline(json!([["LRANGE", key, "0", "-1"]]))
            .await
            .with_context(|| format!("reading seen set for channel {channel:?}"))?;

        let Some(PipelineReply {
            result: Some(Value::Array(items)),
            ..
        }) = replies.into_iter().next()
        else {
            // no key yet: nothing seen today
            return Ok(HashSet::new());
        };

        Ok(items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                other => Some(other.to_string()),
            })
            .collect())
    }

    async fn commit(&self, channel: &str, ids: &[String]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }

        // one key for both commands, even across a midnight rollover
        let key = today_key(channel);
        let mut rpush: Vec<Value> = vec![json!("RPUSH"), json!(key.as_str())];
        rpush.extend(ids.iter().map(|id| json!(id)));
        let expire = json!(["EXPIRE", key.as_str(), KEY_TTL_SECS.to_string()]);

        self.pipeline(json!([rpush, expire]))
        .await
        .with_context(|| format!("appending {} ids for channel {channel:?}", ids.len()))?;
        Ok(())
    }
}
