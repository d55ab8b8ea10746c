// src/ingest/newsapi.rs
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::ingest::types::Article;
use crate::ingest::{ArticleSource, UpstreamError};

pub const DEFAULT_BASE_URL: &str = "https://newsapi.org";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Deserialize)]
struct Envelope {
    articles: Vec<Item>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Item {
    title: Option<String>,
    description: Option<String>,
    url: String,
    published_at: DateTime<Utc>,
}

/// NewsAPI `GET /v2/everything` client scoped to a fixed allow-list of
/// source domains. The base URL is injectable so tests can point it at a
/// mock server.
pub struct NewsApiSource {
    base_url: String,
    api_key: String,
    // Comma-joined allow-list, precomputed for the `domains` query param.
    domains: String,
    client: Client,
    timeout: Duration,
}

impl NewsApiSource {
    pub fn new(api_key: String, domains: &[String]) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
            domains: domains.join(","),
            client: Client::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }
}

#[async_trait]
impl ArticleSource for NewsApiSource {
    async fn fetch(&self, since: Option<DateTime<Utc>>) -> Result<Vec<Article>, UpstreamError> {
        let url = format!("{}/v2/everything", self.base_url);
        let mut query: Vec<(&str, String)> = vec![
            ("domains", self.domains.clone()),
            ("apiKey", self.api_key.clone()),
        ];
        if let Some(ts) = since {
            query.push(("from", ts.to_rfc3339_opts(SecondsFormat::Secs, true)));
        }

        let response = self
            .client
            .get(&url)
            .query(&query)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::HttpStatus(status.as_u16()));
        }

        let body = response.text().await?;
        let envelope: Envelope =
            serde_json::from_str(&body).map_err(|e| UpstreamError::Decode(e.to_string()))?;

        // Missing title/description degrade to empty strings rather than
        // failing the whole batch.
        let articles = envelope
            .articles
            .into_iter()
            .map(|it| Article {
                url: it.url,
                title: it.title.unwrap_or_default(),
                description: it.description.unwrap_or_default(),
                published_at: it.published_at,
            })
            .collect();

        Ok(articles)
    }

    fn name(&self) -> &'static str {
        "NewsAPI"
    }
}
