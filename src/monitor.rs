use std::collections::HashMap;
use std::sync::Arc;

use anyhow::anyhow;
use chrono::Utc;
use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::cache::SeenCache;
use crate::error::MonitorError;
use crate::feed::{FeedSource, Message};
use crate::notify::{DealAlert, Notifier};
use crate::patterns;

/// A message matched by exactly one deal (the lexicographically first that hit).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DealMatch {
    pub deal: String,
    pub message: Message,
}

/// Counts from one successful run.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct RunReport {
    /// Messages returned by the feed.
    pub fetched: usize,
    /// Messages from today not yet in the seen cache.
    pub fresh: usize,
    /// Alerts fired.
    pub matched: usize,
    /// Ids written back to the cache.
    pub committed: usize,
}

/// The deduplicated pattern-matching pipeline.
///
/// One `run` fetches the feed, the seen-cache snapshot and the compiled
/// patterns concurrently, classifies today's unseen messages, fires one alert
/// per matched message and commits the batch of newly seen ids.
///
/// Two concurrent runs for the same channel race on snapshot-then-commit and
/// may both alert on the same message; callers serialize runs per channel.
pub struct DealsMonitor {
    feed: Arc<dyn FeedSource>,
    cache: Arc<dyn SeenCache>,
    notifier: Arc<dyn Notifier>,
    feed_limit: usize,
}

fn alert_for(found: &DealMatch) -> DealAlert {
    DealAlert {
        title: format!("💰 new deal for {:?}!", found.deal),
        message: format!("found on {}", found.message.channel_title),
        url: found.message.link.clone(),
    }
}

impl DealsMonitor {
    pub fn new(
        feed: Arc<dyn FeedSource>,
        cache: Arc<dyn SeenCache>,
        notifier: Arc<dyn Notifier>,
        feed_limit: usize,
    ) -> Self {
        Self {
            feed,
            cache,
            notifier,
            feed_limit,
        }
    }

    pub async fn run(
        &self,
        deals: &HashMap<String, String>,
        channel: &str,
    ) -> Result<RunReport, MonitorError> {
        info!(channel, deals = deals.len(), "starting deals run");

        // Stage 1: snapshot, fetch and compile overlap; all three are awaited
        // to completion before any result is inspected, then failures surface
        // with priority compile > cache read > fetch. Nothing here has side
        // effects worth rolling back.
        let (compiled, snapshot, fetched) = tokio::join!(
            async { patterns::compile(deals) },
            self.cache.snapshot(channel),
            self.feed.recent_messages(channel, self.feed_limit),
        );
        let compiled = compiled?;
        let seen = snapshot.map_err(MonitorError::CacheRead)?;
        let messages = fetched.map_err(MonitorError::Fetch)?;

        // Keep today's (UTC) unseen messages. Older messages were either
        // handled by a previous day's runs or are irrelevant backlog; they are
        // neither matched nor committed.
        let today = Utc::now().date_naive();
        let fetched_count = messages.len();
        let mut batch: Vec<String> = Vec::with_capacity(messages.len());
        let mut found: Vec<DealMatch> = Vec::new();

        for message in messages {
            if message.published_at.date_naive() != today {
                continue;
            }
            if seen.contains(&message.id) {
                continue;
            }
            // Seen from now on, whether or not a deal matches.
            batch.push(message.id.clone());

            if let Some(deal) = first_matching_deal(&compiled, &message) {
                found.push(DealMatch { deal, message });
            }
        }

        let report = RunReport {
            fetched: fetched_count,
            fresh: batch.len(),
            matched: found.len(),
            committed: batch.len(),
        };

        // Stage 2: one task per alert plus one commit task. Every task is
        // awaited even after a failure; the error with the lowest launch index
        // wins so the reported failure is deterministic.
        let mut tasks: JoinSet<(usize, Result<(), MonitorError>)> = JoinSet::new();

        for (index, hit) in found.iter().enumerate() {
            let notifier = Arc::clone(&self.notifier);
            let alert = alert_for(hit);
            tasks.spawn(async move {
                let sent = notifier.send(&alert).await.map_err(MonitorError::Notify);
                (index, sent)
            });
        }

        if !batch.is_empty() {
            let cache = Arc::clone(&self.cache);
            let channel = channel.to_string();
            let commit_index = found.len();
            tasks.spawn(async move {
                let written = cache
                    .commit(&channel, &batch)
                    .await
                    .map_err(MonitorError::CacheWrite);
                (commit_index, written)
            });
        }

        let mut failures: Vec<(usize, MonitorError)> = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(()))) => {}
                Ok((index, Err(err))) => {
                    warn!(channel, index, error = %err, "pipeline task failed");
                    failures.push((index, err));
                }
                Err(join_err) => {
                    warn!(channel, error = %join_err, "pipeline task panicked");
                    failures.push((
                        usize::MAX,
                        MonitorError::Notify(anyhow!("pipeline task panicked: {join_err}")),
                    ));
                }
            }
        }

        failures.sort_by_key(|(index, _)| *index);
        if let Some((_, first)) = failures.into_iter().next() {
            return Err(first);
        }

        info!(
            channel,
            fetched = report.fetched,
            fresh = report.fresh,
            matched = report.matched,
            "deals run finished"
        );
        Ok(report)
    }
}

fn first_matching_deal(
    compiled: &std::collections::BTreeMap<String, regex::Regex>,
    message: &Message,
) -> Option<String> {
    compiled
        .iter()
        .find(|(_, pattern)| pattern.is_match(&message.text))
        .map(|(name, _)| name.clone())
}
