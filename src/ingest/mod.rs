// src/ingest/mod.rs
pub mod newsapi;
pub mod types;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::ingest::types::Article;

/// Failures while fetching from the upstream news API. All variants are
/// recoverable: the dispatcher logs and retries on its next cycle.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Network-level error (DNS, connection, TLS, timeout).
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code.
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Response body was not the expected JSON shape.
    #[error("malformed response body: {0}")]
    Decode(String),
}

/// The upstream fetch capability. `since` narrows the window to articles
/// published after the watermark; implementations return batches newest
/// first, per upstream convention. Zero articles is an empty `Ok`, not an
/// error.
#[async_trait]
pub trait ArticleSource {
    async fn fetch(&self, since: Option<DateTime<Utc>>) -> Result<Vec<Article>, UpstreamError>;
    fn name(&self) -> &'static str;
}
