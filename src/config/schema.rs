//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::logger::level::{Level, LevelMask};
use crate::logger::rotation::RotationMode;

/// Default collector endpoint for remote tracking.
pub const DEFAULT_TRACKING_URL: &str = "http://tracking.bdp.cn/stat?guid=tracking";

/// Root configuration for one logger instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// File name prefix (basename, no directory components).
    pub prefix: String,

    /// Directory log files are written to.
    pub directory: PathBuf,

    /// When the active file is replaced.
    pub rotation: RotationMode,

    /// Size threshold in KiB, used by `RotationMode::Size` only.
    pub max_size_kb: u64,

    /// Enabled severities. VIP entries are always written.
    pub levels: Vec<Level>,

    /// Write buffered entries to disk.
    pub keep_in_file: bool,

    /// Address used to tag entries and name files.
    /// Discovered from the host when unset.
    pub address: Option<String>,

    /// Flush when the last flush is older than this.
    pub write_interval_ms: u64,

    /// Flush when buffered bytes exceed this.
    pub write_buffer_check_bytes: usize,

    /// Background timer cadence.
    pub tick_interval_ms: u64,

    /// Remote tracking settings.
    pub tracking: TrackingConfig,
}

impl LoggerConfig {
    /// Config for `prefix` with every other field at its default.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Self::default()
        }
    }

    /// Severity mask built from `levels`.
    pub fn level_mask(&self) -> LevelMask {
        self.levels
            .iter()
            .fold(LevelMask::NONE, |mask, level| mask | LevelMask::of(*level))
    }

    /// Replace `levels` with the severities enabled in `mask`.
    pub fn with_mask(mut self, mask: LevelMask) -> Self {
        self.levels = Level::ALL
            .into_iter()
            .filter(|level| *level != Level::Vip && mask.enables(*level))
            .collect();
        self
    }

    /// Size threshold in bytes.
    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_kb.saturating_mul(1024)
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            prefix: "elog".to_string(),
            directory: PathBuf::from("."),
            rotation: RotationMode::Day,
            max_size_kb: 100,
            levels: vec![Level::Fatal, Level::Error, Level::Info],
            keep_in_file: true,
            address: None,
            write_interval_ms: 10,
            write_buffer_check_bytes: 32 * 1024,
            tick_interval_ms: 1000,
            tracking: TrackingConfig::default(),
        }
    }
}

/// Remote tracking configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Start forwarding as soon as the logger is built.
    pub enabled: bool,

    /// Collector endpoint; entry fields are appended as query parameters.
    pub url: String,

    /// Identifies this logger to the collector.
    pub collector_id: u32,

    /// Capacity of the tracking queue. Entries beyond it are dropped.
    pub queue_capacity: usize,

    /// Connect and request deadline in seconds.
    pub timeout_secs: u64,

    /// How long finalize waits for queued entries to drain.
    pub drain_timeout_ms: u64,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: DEFAULT_TRACKING_URL.to_string(),
            collector_id: 0,
            queue_capacity: 256,
            timeout_secs: 10,
            drain_timeout_ms: 2000,
        }
    }
}
