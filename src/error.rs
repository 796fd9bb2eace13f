use thiserror::Error;

/// Failure taxonomy for one pipeline run.
///
/// `Pattern`, `CacheRead` and `Fetch` abort the run before any notification or
/// cache write is attempted. `Notify` and `CacheWrite` are reported only after
/// every launched side-effect task has finished, so some alerts may already be
/// delivered when the caller sees the error.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("invalid pattern for deal {name:?}: {source}")]
    Pattern {
        name: String,
        #[source]
        source: regex::Error,
    },

    #[error("feed fetch failed: {0:#}")]
    Fetch(anyhow::Error),

    #[error("cache read failed: {0:#}")]
    CacheRead(anyhow::Error),

    #[error("cache write failed: {0:#}")]
    CacheWrite(anyhow::Error),

    #[error("notification failed: {0:#}")]
    Notify(anyhow::Error),
}
