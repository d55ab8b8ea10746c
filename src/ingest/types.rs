// src/ingest/types.rs
use chrono::{DateTime, Utc};

/// One upstream article, immutable once fetched. The URL is the identity
/// used for delivery deduplication.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct Article {
    pub url: String,
    pub title: String,
    pub description: String,
    pub published_at: DateTime<Utc>,
}

/// Publish time of the most recently fetched article, used to narrow the
/// next fetch window. Never moves backwards; updated only by the dispatcher
/// after a successful fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Watermark(Option<DateTime<Utc>>);

impl Watermark {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the watermark forward to `ts`. A `ts` at or before the current
    /// value is ignored.
    pub fn advance(&mut self, ts: DateTime<Utc>) {
        match self.0 {
            Some(current) if ts <= current => {}
            _ => self.0 = Some(ts),
        }
    }

    pub fn get(&self) -> Option<DateTime<Utc>> {
        self.0
    }
}
