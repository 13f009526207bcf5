use log::{debug, error, info};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::card::ChatCard;
use crate::config::HttpConfig;
use crate::error::ForwardError;

pub const CONTENT_TYPE_JSON: &str = "application/json; charset=UTF-8";

#[derive(Debug, Deserialize)]
struct SendResponse {
    thread: ResponseThread,
}

#[derive(Debug, Deserialize)]
struct ResponseThread {
    name: String,
}

pub struct ChatClient {
    client: Client,
    timeout: Duration,
}

impl ChatClient {
    pub fn new(config: &HttpConfig) -> Result<Self, ForwardError> {
        let timeout = Duration::from_millis(config.timeout_ms);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ForwardError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(ChatClient { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Posts the card once and returns the thread name the chat service assigned.
    pub async fn send(&self, webhook_url: &str, card: &ChatCard) -> Result<String, ForwardError> {
        let body = serde_json::to_string(card)?;
        debug!("Posting card: {}", body);

        let response = self
            .client
            .post(webhook_url)
            .header(CONTENT_TYPE, CONTENT_TYPE_JSON)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            error!("Chat webhook answered {}: {}", status, text);
            return Err(ForwardError::Delivery(format!(
                "webhook request failed with status: {}",
                status
            )));
        }

        let text = response.text().await?;
        let parsed: SendResponse = serde_json::from_str(&text).map_err(|e| {
            ForwardError::Delivery(format!("response has no thread.name: {}", e))
        })?;

        info!("Card delivered to thread {}", parsed.thread.name);
        Ok(parsed.thread.name)
    }
}
