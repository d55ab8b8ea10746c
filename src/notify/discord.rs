use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use super::{ChannelSink, SinkError};

pub const DEFAULT_BASE_URL: &str = "https://discord.com/api/v10";
const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Posts plain-text messages to one Discord channel through the REST API.
/// Each `send` is a single HTTP call; retry policy belongs to the caller.
#[derive(Clone)]
pub struct DiscordSink {
    token: String,
    channel_id: u64,
    base_url: String,
    client: Client,
    timeout: Duration,
}

impl DiscordSink {
    pub fn new(token: String, channel_id: u64) -> Self {
        Self {
            token,
            channel_id,
            base_url: DEFAULT_BASE_URL.to_string(),
            client: Client::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl ChannelSink for DiscordSink {
    async fn send(&self, text: &str) -> Result<(), SinkError> {
        let url = format!("{}/channels/{}/messages", self.base_url, self.channel_id);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bot {}", self.token))
            .timeout(self.timeout)
            .json(&CreateMessage { content: text })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SinkError::HttpStatus(status.as_u16()));
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct CreateMessage<'a> {
    content: &'a str,
}
