//! Loki shipper: bounded hand-off queue plus one aggregator task.
//!
//! The aggregator is the only owner of the pending [`Batch`]. It flushes when
//! either
//! - the number of distinct label sets reaches `batch_size`, or
//! - `batch_wait` has elapsed since the last flush,
//!
//! whichever comes first. A failed push is logged and the batch is dropped.
//! On shutdown whatever is still pending is dropped as well.

use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use hooktail_core::application::constants::{
    DEFAULT_BATCH_SIZE, DEFAULT_BATCH_WAIT, DEFAULT_PUSH_TIMEOUT, DEFAULT_SHIPPER_QUEUE_CAPACITY,
};
use hooktail_core::application::ShutdownToken;
use hooktail_core::domain::LogEntry;
use hooktail_core::port::LogShipper;

use crate::batch::Batch;
use crate::client::LokiClient;
use crate::error::ShipError;

/// Shipping parameters
#[derive(Debug, Clone)]
pub struct LokiConfig {
    /// Base URL of the Loki instance
    pub url: String,
    /// Time trigger
    pub batch_wait: Duration,
    /// Size trigger, in distinct label sets
    pub batch_size: usize,
    /// Bound for one push request
    pub timeout: Duration,
    /// Entries buffered between producers and the aggregator
    pub queue_capacity: usize,
}

impl LokiConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            batch_wait: DEFAULT_BATCH_WAIT,
            batch_size: DEFAULT_BATCH_SIZE,
            timeout: DEFAULT_PUSH_TIMEOUT,
            queue_capacity: DEFAULT_SHIPPER_QUEUE_CAPACITY,
        }
    }
}

/// Producer-side handle of the shipping pipeline
#[derive(Clone)]
pub struct LokiShipper {
    tx: mpsc::Sender<LogEntry>,
}

impl LokiShipper {
    /// Start the aggregator task
    ///
    /// The returned handle resolves once `shutdown` fires or every
    /// `LokiShipper` clone is dropped.
    pub fn spawn(
        config: LokiConfig,
        shutdown: ShutdownToken,
    ) -> Result<(Self, JoinHandle<()>), ShipError> {
        let client = LokiClient::new(&config.url, config.timeout)?;
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));

        info!(
            url = %client.push_url(),
            batch_size = config.batch_size,
            batch_wait_ms = config.batch_wait.as_millis() as u64,
            "Starting Loki shipper"
        );

        let aggregator = Aggregator {
            rx,
            client,
            shutdown,
            batch_size: config.batch_size.max(1),
            // tokio intervals panic on a zero period
            batch_wait: config.batch_wait.max(Duration::from_millis(1)),
        };

        Ok((Self { tx }, tokio::spawn(aggregator.run())))
    }
}

#[async_trait]
impl LogShipper for LokiShipper {
    async fn enqueue(&self, entry: LogEntry) {
        if self.tx.send(entry).await.is_err() {
            debug!("Loki shipper stopped, dropping log entry");
        }
    }
}

struct Aggregator {
    rx: mpsc::Receiver<LogEntry>,
    client: LokiClient,
    shutdown: ShutdownToken,
    batch_size: usize,
    batch_wait: Duration,
}

impl Aggregator {
    async fn run(self) {
        let Aggregator {
            mut rx,
            client,
            mut shutdown,
            batch_size,
            batch_wait,
        } = self;

        let mut batch = Batch::new();
        let mut ticker = interval_at(Instant::now() + batch_wait, batch_wait);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                _ = shutdown.wait() => break,

                // Polled before the queue so a steady stream cannot starve it
                _ = ticker.tick() => {
                    if !batch.is_empty() {
                        flush(&client, batch.take()).await;
                    }
                }

                entry = rx.recv() => match entry {
                    Some(entry) => {
                        batch.push(entry);
                        if batch.group_count() >= batch_size {
                            flush(&client, batch.take()).await;
                            ticker.reset();
                        }
                    }
                    None => break,
                },
            }
        }

        if !batch.is_empty() {
            info!(
                groups = batch.group_count(),
                entries = batch.entry_count(),
                "Loki shipper stopping, pending batch dropped"
            );
        }
        info!("Loki shipper stopped");
    }
}

async fn flush(client: &LokiClient, batch: Batch) {
    let groups = batch.group_count();
    let entries = batch.entry_count();

    match client.push(&batch.into_push_request()).await {
        Ok(()) => debug!(groups, entries, "Log batch pushed to Loki"),
        Err(e) => warn!(groups, entries, error = %e, "Failed to push log batch to Loki, batch dropped"),
    }
}
