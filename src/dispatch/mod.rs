// src/dispatch/mod.rs
pub mod dedupe;
pub mod queue;

use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;
use tokio::sync::watch;

use crate::ingest::types::Watermark;
use crate::ingest::ArticleSource;
use crate::notify::{format_article, ChannelSink};
use dedupe::DedupeStore;
use queue::DeliveryQueue;

/// One-time metrics registration.
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("relay_cycles_total", "Dispatch cycles run.");
        describe_counter!(
            "relay_fetched_total",
            "Articles returned by the upstream source."
        );
        describe_counter!("relay_fetch_errors_total", "Upstream fetch failures.");
        describe_counter!(
            "relay_queue_dropped_total",
            "Articles evicted by queue overflow."
        );
        describe_counter!(
            "relay_dedup_skipped_total",
            "Deliveries suppressed as duplicates."
        );
        describe_counter!(
            "relay_delivered_total",
            "Messages successfully sent downstream."
        );
        describe_counter!("relay_send_errors_total", "Downstream send failures.");
        describe_gauge!("relay_last_cycle_ts", "Unix ts when the last cycle finished.");
    });
}

#[derive(Clone, Copy, Debug)]
pub struct DispatcherCfg {
    pub interval_secs: u64,
    pub queue_capacity: usize,
}

/// Outcome counts for a single fetch/deliver cycle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub fetched: usize,
    pub dropped: usize,
    pub delivered: usize,
    pub duplicates: usize,
    pub send_failures: usize,
    pub fetch_failed: bool,
}

/// Owns the whole relay state (queue, dedupe set, watermark) and runs the
/// fetch -> filter/deliver -> sleep cycle. Single-task: no two cycles ever
/// overlap, so none of the owned structures need synchronization.
pub struct Dispatcher<S, K> {
    source: S,
    sink: K,
    queue: DeliveryQueue,
    delivered: DedupeStore,
    watermark: Watermark,
    interval: Duration,
}

impl<S: ArticleSource, K: ChannelSink> Dispatcher<S, K> {
    pub fn new(source: S, sink: K, cfg: DispatcherCfg) -> Self {
        ensure_metrics_described();
        Self {
            source,
            sink,
            queue: DeliveryQueue::new(cfg.queue_capacity),
            delivered: DedupeStore::new(),
            watermark: Watermark::new(),
            interval: Duration::from_secs(cfg.interval_secs),
        }
    }

    pub fn watermark(&self) -> Watermark {
        self.watermark
    }

    /// One cycle: fetch into the queue, then drain through the dedupe
    /// filter into the sink. A fetch failure skips straight to the end of
    /// the cycle; the next cycle is the retry.
    pub async fn run_cycle(&mut self) -> CycleReport {
        let mut report = CycleReport::default();

        match self.source.fetch(self.watermark.get()).await {
            Ok(articles) => {
                report.fetched = articles.len();
                counter!("relay_fetched_total").increment(articles.len() as u64);
                if let Some(first) = articles.first() {
                    // Upstream returns newest first; the head stamp narrows
                    // the next fetch window.
                    self.watermark.advance(first.published_at);
                }
                for article in articles {
                    if self.queue.push(article) {
                        report.dropped += 1;
                        counter!("relay_queue_dropped_total").increment(1);
                    }
                }
                self.drain_queue(&mut report).await;
            }
            Err(e) => {
                report.fetch_failed = true;
                counter!("relay_fetch_errors_total").increment(1);
                tracing::warn!(
                    error = %e,
                    source = self.source.name(),
                    "fetch failed, retrying next cycle"
                );
            }
        }

        counter!("relay_cycles_total").increment(1);
        gauge!("relay_last_cycle_ts").set(chrono::Utc::now().timestamp().max(0) as f64);
        report
    }

    async fn drain_queue(&mut self, report: &mut CycleReport) {
        while let Some(article) = self.queue.pop() {
            if self.delivered.contains(&article.url) {
                report.duplicates += 1;
                counter!("relay_dedup_skipped_total").increment(1);
                continue;
            }
            let message = format_article(&article);
            match self.sink.send(&message).await {
                Ok(()) => {
                    self.delivered.record(article.url);
                    report.delivered += 1;
                    counter!("relay_delivered_total").increment(1);
                }
                Err(e) => {
                    // Not recorded and not re-queued: a later re-fetch of
                    // the same URL gets another delivery attempt.
                    report.send_failures += 1;
                    counter!("relay_send_errors_total").increment(1);
                    tracing::warn!(
                        error = %e,
                        url = %article.url,
                        "send failed, dropping article"
                    );
                }
            }
        }
    }

    /// Run cycles until `shutdown` flips to true. The flag is honored at
    /// the top of each cycle and during the sleep.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        loop {
            if *shutdown.borrow() {
                break;
            }

            let report = self.run_cycle().await;
            tracing::info!(
                target: "dispatch",
                fetched = report.fetched,
                delivered = report.delivered,
                duplicates = report.duplicates,
                dropped = report.dropped,
                send_failures = report.send_failures,
                fetch_failed = report.fetch_failed,
                "cycle complete"
            );

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        tracing::info!(target: "dispatch", "dispatcher stopped");
    }
}
