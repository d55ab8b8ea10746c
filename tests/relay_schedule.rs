// tests/relay_schedule.rs
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::watch;

use news_relay::dispatch::{Dispatcher, DispatcherCfg};
use news_relay::ingest::types::Article;
use news_relay::ingest::{ArticleSource, UpstreamError};
use news_relay::notify::{ChannelSink, SinkError};

#[derive(Clone, Default)]
struct ScriptedSource {
    batches: Arc<Mutex<VecDeque<Result<Vec<Article>, UpstreamError>>>>,
    fetches: Arc<Mutex<usize>>,
}

impl ScriptedSource {
    fn fetch_count(&self) -> usize {
        *self.fetches.lock().unwrap()
    }
}

#[async_trait]
impl ArticleSource for ScriptedSource {
    async fn fetch(&self, _since: Option<DateTime<Utc>>) -> Result<Vec<Article>, UpstreamError> {
        *self.fetches.lock().unwrap() += 1;
        self.batches
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

#[derive(Clone, Default)]
struct RecordingSink {
    sent: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl ChannelSink for RecordingSink {
    async fn send(&self, text: &str) -> Result<(), SinkError> {
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

// Paused-clock test: sleeps auto-advance, so three 30-second cycles and the
// shutdown all resolve instantly and deterministically.
#[tokio::test(start_paused = true)]
async fn failed_fetch_does_not_stall_the_schedule() {
    let source = ScriptedSource::default();
    {
        let mut batches = source.batches.lock().unwrap();
        batches.push_back(Err(UpstreamError::HttpStatus(503)));
        batches.push_back(Ok(vec![Article {
            url: "u1".into(),
            title: "T1".into(),
            description: "D1".into(),
            published_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        }]));
    }
    let sink = RecordingSink::default();
    let dispatcher = Dispatcher::new(
        source.clone(),
        sink.clone(),
        DispatcherCfg {
            interval_secs: 30,
            queue_capacity: 100,
        },
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let worker = tokio::spawn(dispatcher.run(shutdown_rx));

    // Cycles fire at t=0 (fetch error), t=30 (delivery), t=60 (empty).
    tokio::time::sleep(Duration::from_secs(75)).await;
    shutdown_tx.send(true).unwrap();
    worker.await.unwrap();

    assert_eq!(source.fetch_count(), 3);
    assert_eq!(
        sink.sent.lock().unwrap().clone(),
        vec!["**T1**\nD1\nu1".to_string()]
    );
}

#[tokio::test(start_paused = true)]
async fn shutdown_during_sleep_stops_promptly() {
    let source = ScriptedSource::default();
    let sink = RecordingSink::default();
    let dispatcher = Dispatcher::new(
        source.clone(),
        sink,
        DispatcherCfg {
            interval_secs: 3600,
            queue_capacity: 100,
        },
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let worker = tokio::spawn(dispatcher.run(shutdown_rx));

    // One cycle runs, then the worker is deep in its hour-long sleep.
    tokio::time::sleep(Duration::from_secs(5)).await;
    shutdown_tx.send(true).unwrap();
    worker.await.unwrap();

    assert_eq!(source.fetch_count(), 1);
}
