// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod feed;
pub mod monitor;
pub mod notify;
pub mod patterns;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::error::MonitorError;
pub use crate::monitor::{DealMatch, DealsMonitor, RunReport};
pub use crate::notify::{DealAlert, Notifier};
