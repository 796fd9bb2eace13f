pub mod pushover;

use anyhow::Result;
use async_trait::async_trait;

pub use pushover::PushoverNotifier;

/// One deal-found alert, ready for a push gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DealAlert {
    pub title: String,
    pub message: String,
    pub url: String,
}

/// Delivers a single alert to a human. No batching, no dedup, no retries:
/// dedup belongs to the pipeline's seen cache, retry to whatever scheduler
/// invokes the run.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, alert: &DealAlert) -> Result<()>;
}
