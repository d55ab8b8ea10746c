pub mod discord;

use async_trait::async_trait;
use thiserror::Error;

use crate::ingest::types::Article;

/// Failures while posting to the downstream channel. Recovered by dropping
/// the article; the dispatcher never retries a failed send.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Network-level error (DNS, connection, TLS, timeout).
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code.
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
}

/// The downstream send capability: one message visible in the channel per
/// successful call. No batching, no built-in retry.
#[async_trait]
pub trait ChannelSink {
    async fn send(&self, text: &str) -> Result<(), SinkError>;
}

/// Fixed three-line delivery template. Title and description go in
/// verbatim; markup characters inside them are not escaped, so an article
/// title containing e.g. `**` can bleed into the channel formatting.
pub fn format_article(article: &Article) -> String {
    format!(
        "**{}**\n{}\n{}",
        article.title, article.description, article.url
    )
}
