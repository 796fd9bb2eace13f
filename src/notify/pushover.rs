use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;

use super::{DealAlert, Notifier};

const PUSHOVER_API_URL: &str = "https://api.pushover.net/1/messages.json";

pub struct PushoverNotifier {
    token: String,
    user: String,
    endpoint: String,
    client: Client,
}

impl PushoverNotifier {
    pub fn new(token: String, user: String) -> Self {
        Self {
            token,
            user,
            endpoint: PUSHOVER_API_URL.to_string(),
            client: Client::new(),
        }
    }

    /// Override the gateway endpoint (tests, self-hosted relays).
    pub fn with_endpoint(mut self, endpoint: String) -> Self {
        self.endpoint = endpoint;
        self
    }
}

#[async_trait]
impl Notifier for PushoverNotifier {
    async fn send(&self, alert: &DealAlert) -> Result<()> {
        let params = [
            ("token", self.token.as_str()),
            ("user", self.user.as_str()),
            ("title", alert.title.as_str()),
            ("message", alert.message.as_str()),
            ("url", alert.url.as_str()),
        ];

        self.client
            .post(&self.endpoint)
            .form(&params)
            .send()
            .await
            .context("pushover post")?
            .error_for_status()
            .context("pushover non-2xx")?;
        Ok(())
    }
}
