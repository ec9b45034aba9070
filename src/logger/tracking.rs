//! Remote tracking: bounded queue and single sender task.
//!
//! # Data Flow
//! ```text
//! flush (under logger lock)
//!     → enqueue(): try_send, newest entry dropped when full
//!     → mpsc channel (bounded)
//!     → TrackingSender::run (one task per logger)
//!     → GET {url}&collector_id=..&src_ip=..&src_date=..&log_level=..&{message}
//! ```
//!
//! # Design Decisions
//! - The write path never waits on the queue or the network
//! - One attempt per entry, bounded by the client timeout; failures are counted
//! - Response bodies are discarded

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, error::TrySendError};
use url::Url;

use crate::config::TrackingConfig;
use crate::error::Result;
use crate::logger::format::FIELD_SEPARATOR;
use crate::observability::metrics;

pub const PARAM_COLLECTOR: &str = "collector_id";
pub const PARAM_IP: &str = "src_ip";
pub const PARAM_DATE: &str = "src_date";
pub const PARAM_LEVEL: &str = "log_level";

/// Counters shared by the producers and the sender.
#[derive(Debug, Default)]
pub struct TrackingStats {
    enqueued: AtomicU64,
    dropped: AtomicU64,
    delivered: AtomicU64,
    failed: AtomicU64,
}

/// Point-in-time copy of [`TrackingStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrackingSnapshot {
    pub enqueued: u64,
    pub dropped: u64,
    pub delivered: u64,
    pub failed: u64,
}

impl TrackingStats {
    pub fn snapshot(&self) -> TrackingSnapshot {
        TrackingSnapshot {
            enqueued: self.enqueued.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// Offer a line to the tracking queue without waiting.
///
/// A full or closed queue drops the line and counts it.
pub fn enqueue(tx: &mpsc::Sender<String>, line: String, stats: &TrackingStats) {
    match tx.try_send(line) {
        Ok(()) => {
            stats.enqueued.fetch_add(1, Ordering::Relaxed);
            metrics::record_tracking("enqueued");
        }
        Err(TrySendError::Full(_)) | Err(TrySendError::Closed(_)) => {
            stats.dropped.fetch_add(1, Ordering::Relaxed);
            metrics::record_tracking("dropped");
        }
    }
}

/// Collector URL for one formatted line.
///
/// Returns `None` for lines that do not carry all five fields.
pub fn tracking_url(base: &Url, collector_id: u32, line: &str) -> Option<Url> {
    let line = line.trim_end_matches(&['\r', '\n'][..]);
    let fields: Vec<&str> = line.splitn(5, FIELD_SEPARATOR).collect();
    let [ip, date, _location, level, message] = fields.as_slice() else {
        return None;
    };

    let mut url = base.clone();
    url.query_pairs_mut()
        .append_pair(PARAM_COLLECTOR, &collector_id.to_string())
        .append_pair(PARAM_IP, ip)
        .append_pair(PARAM_DATE, date)
        .append_pair(PARAM_LEVEL, level);

    // The message is expected to already be `key=value&...`.
    if !message.is_empty() {
        let query = format!("{}&{}", url.query().unwrap_or_default(), message);
        url.set_query(Some(&query));
    }
    Some(url)
}

/// Consumer side of the tracking queue.
pub struct TrackingSender {
    client: reqwest::Client,
    base: Url,
    collector_id: Arc<AtomicU32>,
    stats: Arc<TrackingStats>,
}

impl TrackingSender {
    /// Build a sender with the configured deadline.
    pub fn new(
        config: &TrackingConfig,
        collector_id: Arc<AtomicU32>,
        stats: Arc<TrackingStats>,
    ) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .pool_max_idle_per_host(0)
            .no_proxy()
            .build()?;
        let base = Url::parse(&config.url)?;

        Ok(Self {
            client,
            base,
            collector_id,
            stats,
        })
    }

    /// Deliver entries until the queue is closed and empty.
    pub async fn run(self, mut rx: mpsc::Receiver<String>) {
        tracing::info!(url = %self.base, "Tracking sender starting");

        while let Some(line) = rx.recv().await {
            self.deliver(&line).await;
        }

        tracing::info!("Tracking queue closed, sender exiting");
    }

    async fn deliver(&self, line: &str) {
        let collector_id = self.collector_id.load(Ordering::Relaxed);
        let Some(url) = tracking_url(&self.base, collector_id, line) else {
            return;
        };

        let ok = match self.client.get(url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!(error = %e, timeout = e.is_timeout(), "Tracking request failed");
                false
            }
        };

        if ok {
            self.stats.delivered.fetch_add(1, Ordering::Relaxed);
            metrics::record_tracking("delivered");
        } else {
            self.stats.failed.fetch_add(1, Ordering::Relaxed);
            metrics::record_tracking("failed");
        }
    }
}
