// src/dispatch/queue.rs
use std::collections::VecDeque;

use crate::ingest::types::Article;

/// Bounded buffer between fetch and delivery, absorbing bursts from the
/// source faster than the sink drains. Delivery order is FIFO: the
/// oldest-fetched article goes out first, keeping the channel roughly
/// chronological. At capacity, `push` evicts the oldest queued entry;
/// evicted articles are never retried here (the upstream window may still
/// re-return them on a later fetch).
#[derive(Debug)]
pub struct DeliveryQueue {
    buf: VecDeque<Article>,
    capacity: usize,
}

impl DeliveryQueue {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buf: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Never blocks, never fails. Returns true when an older entry was
    /// evicted to make room.
    pub fn push(&mut self, article: Article) -> bool {
        let evicted = if self.buf.len() == self.capacity {
            self.buf.pop_front();
            true
        } else {
            false
        };
        self.buf.push_back(article);
        evicted
    }

    pub fn pop(&mut self) -> Option<Article> {
        self.buf.pop_front()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn article(url: &str) -> Article {
        Article {
            url: url.to_string(),
            title: "t".into(),
            description: "d".into(),
            published_at: Utc.with_ymd_and_hms(2025, 9, 6, 9, 0, 0).unwrap(),
        }
    }

    #[test]
    fn pops_in_fifo_order() {
        let mut q = DeliveryQueue::new(10);
        q.push(article("a"));
        q.push(article("b"));
        q.push(article("c"));
        assert_eq!(q.pop().unwrap().url, "a");
        assert_eq!(q.pop().unwrap().url, "b");
        assert_eq!(q.pop().unwrap().url, "c");
        assert!(q.pop().is_none());
    }

    #[test]
    fn overflow_evicts_oldest_and_keeps_bound() {
        let mut q = DeliveryQueue::new(3);
        assert!(!q.push(article("a")));
        assert!(!q.push(article("b")));
        assert!(!q.push(article("c")));
        assert!(q.push(article("d")));
        assert_eq!(q.len(), 3);
        assert_eq!(q.pop().unwrap().url, "b");
        assert_eq!(q.pop().unwrap().url, "c");
        assert_eq!(q.pop().unwrap().url, "d");
    }

    #[test]
    fn length_never_exceeds_capacity() {
        let mut q = DeliveryQueue::new(5);
        for i in 0..50 {
            q.push(article(&format!("u{i}")));
            assert!(q.len() <= q.capacity());
        }
    }
}
