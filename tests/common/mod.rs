// tests/common/mod.rs
// In-memory fakes for the pipeline's collaborators, recording every call.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

use deals_monitor::cache::SeenCache;
use deals_monitor::feed::{FeedSource, Message};
use deals_monitor::monitor::DealsMonitor;
use deals_monitor::notify::{DealAlert, Notifier};

pub fn deals(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(n, p)| (n.to_string(), p.to_string()))
        .collect()
}

pub fn message(id: &str, published_at: DateTime<Utc>, text: &str) -> Message {
    Message {
        id: id.to_string(),
        published_at,
        text: text.to_string(),
        channel_title: "Deals Channel".to_string(),
        link: format!("https://t.me/dealschan/{id}"),
    }
}

pub fn today_message(id: &str, text: &str) -> Message {
    message(id, Utc::now(), text)
}

pub fn yesterday_message(id: &str, text: &str) -> Message {
    message(id, Utc::now() - Duration::days(1), text)
}

#[derive(Default)]
pub struct FakeFeed {
    messages: Vec<Message>,
    fail: bool,
    pub calls: Mutex<Vec<(String, usize)>>,
}

impl FakeFeed {
    pub fn with_messages(messages: Vec<Message>) -> Arc<Self> {
        Arc::new(Self {
            messages,
            ..Default::default()
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Default::default()
        })
    }
}

#[async_trait]
impl FeedSource for FakeFeed {
    async fn recent_messages(&self, channel: &str, limit: usize) -> Result<Vec<Message>> {
        self.calls.lock().push((channel.to_string(), limit));
        if self.fail {
            return Err(anyhow!("feed returned 502 Bad Gateway"));
        }
        Ok(self.messages.clone())
    }
}

#[derive(Default)]
pub struct FakeCache {
    seen: HashSet<String>,
    fail_snapshot: bool,
    fail_commit: bool,
    pub commits: Mutex<Vec<(String, Vec<String>)>>,
}

impl FakeCache {
    pub fn empty() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_seen(ids: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            seen: ids.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        })
    }

    pub fn failing_snapshot() -> Arc<Self> {
        Arc::new(Self {
            fail_snapshot: true,
            ..Default::default()
        })
    }

    pub fn failing_commit() -> Arc<Self> {
        Arc::new(Self {
            fail_commit: true,
            ..Default::default()
        })
    }
}

#[async_trait]
impl SeenCache for FakeCache {
    async fn snapshot(&self, _channel: &str) -> Result<HashSet<String>> {
        if self.fail_snapshot {
            return Err(anyhow!("cache store unreachable"));
        }
        Ok(self.seen.clone())
    }

    async fn commit(&self, channel: &str, ids: &[String]) -> Result<()> {
        self.commits.lock().push((channel.to_string(), ids.to_vec()));
        if self.fail_commit {
            return Err(anyhow!("cache store rejected write"));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeNotifier {
    fail: bool,
    pub alerts: Mutex<Vec<DealAlert>>,
}

impl FakeNotifier {
    pub fn ok() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Default::default()
        })
    }
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn send(&self, alert: &DealAlert) -> Result<()> {
        self.alerts.lock().push(alert.clone());
        if self.fail {
            return Err(anyhow!("push gateway returned 500"));
        }
        Ok(())
    }
}

pub fn monitor(
    feed: Arc<FakeFeed>,
    cache: Arc<FakeCache>,
    notifier: Arc<FakeNotifier>,
) -> DealsMonitor {
    DealsMonitor::new(feed, cache, notifier, 20)
}
