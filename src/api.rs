use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::error;

use crate::monitor::{DealsMonitor, RunReport};

#[derive(Clone)]
pub struct AppState {
    pub monitor: Arc<DealsMonitor>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/deals", post(parse_deals))
        .with_state(state)
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct DealsRequest {
    channel_username: String,
    monitored_deals: HashMap<String, String>,
}

/// Trigger one pipeline run. Failures come back as a bare 500: which deal or
/// message broke the run is logged here, not exposed to the caller.
async fn parse_deals(
    State(state): State<AppState>,
    Json(body): Json<DealsRequest>,
) -> Result<Json<RunReport>, StatusCode> {
    match state
        .monitor
        .run(&body.monitored_deals, &body.channel_username)
        .await
    {
        Ok(report) => Ok(Json(report)),
        Err(err) => {
            error!(channel = %body.channel_username, error = %err, "deals run failed");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
