//! Buffered, rotating logger with an optional remote tracking sink.
//!
//! # Data Flow
//! ```text
//! caller (any thread)
//!     → entry point: mask check, Entry, Formatter
//!     → write path (under the state lock)
//!         → buffer.rs (append)
//!         → rotation.rs (maybe move to a new file)
//!         → drain when the last flush is stale or the buffer is large
//!             → file (open, append, close)
//!             → tracking.rs queue → TrackingSender task → collector
//!
//! timer.rs ticks the write path with no entry so stale data still drains.
//! ```
//!
//! # Design Decisions
//! - One lock per logger guards buffer, rotation state and sink flags;
//!   file I/O triggered by a write happens while it is held, keeping order
//! - A failed flush still clears the buffer; nothing is retried
//! - The tracking queue is bounded and never blocks the lock holder
//! - `finalize` stops the timer and the sender before any caller returns

pub mod buffer;
pub mod clock;
pub mod entry;
pub mod format;
pub mod identity;
pub mod level;
pub mod naming;
pub mod rotation;
pub mod timer;
pub mod tracking;

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, Local};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::{validation::validate_config, ConfigError, LoggerConfig};
use crate::error::{Error, LogFailure, Result};
use crate::lifecycle::Shutdown;
use crate::observability::metrics;

use self::buffer::{concat, LineBuffer};
use self::clock::{epoch_millis, Clock, SystemClock};
use self::entry::Entry;
use self::format::{Formatter, PipeFormatter};
use self::level::{Level, LevelMask};
use self::rotation::{remove_backup, Rotation, RotationMode, Rotator};
use self::tracking::{TrackingSender, TrackingSnapshot, TrackingStats};

/// Exit status used after a fatal entry.
pub const FATAL_EXIT_CODE: i32 = 1;

/// Callback invoked for every write-path failure.
pub type ErrorObserver = Arc<dyn Fn(&LogFailure) + Send + Sync>;

/// Handle to a logger. Clones share the same instance.
#[derive(Clone)]
pub struct ELog {
    shared: Arc<Shared>,
}

pub(crate) struct Shared {
    state: RwLock<State>,
    tasks: Mutex<Tasks>,
    /// Held for the whole of `finalize`, so overlapping calls wait.
    finalizing: tokio::sync::Mutex<()>,
    mask: LevelMask,
    address: String,
    write_interval_ms: i64,
    write_buffer_check_bytes: usize,
    drain_timeout: Duration,
    clock: Arc<dyn Clock>,
    formatter: Arc<dyn Formatter>,
    observer: Option<ErrorObserver>,
    stats: Arc<TrackingStats>,
    collector_id: Arc<AtomicU32>,
    runtime: Handle,
    shutdown: Shutdown,
}

struct State {
    rotator: Rotator,
    buffer: LineBuffer,
    last_flush_ms: i64,
    keep_in_file: bool,
    keep_in_tracking: bool,
    /// `None` once finalized.
    tracking_tx: Option<mpsc::Sender<String>>,
}

#[derive(Default)]
struct Tasks {
    timer: Option<JoinHandle<()>>,
    sender: Option<JoinHandle<()>>,
    /// Sender and receiver half, until tracking is first enabled.
    pending: Option<(TrackingSender, mpsc::Receiver<String>)>,
}

/// Configures optional collaborators before building an [`ELog`].
pub struct ELogBuilder {
    config: LoggerConfig,
    clock: Arc<dyn Clock>,
    formatter: Arc<dyn Formatter>,
    observer: Option<ErrorObserver>,
}

impl ELogBuilder {
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn formatter(mut self, formatter: impl Formatter + 'static) -> Self {
        self.formatter = Arc::new(formatter);
        self
    }

    /// Observe file open/write and rotation failures.
    pub fn on_error(mut self, observer: impl Fn(&LogFailure) + Send + Sync + 'static) -> Self {
        self.observer = Some(Arc::new(observer));
        self
    }

    /// Build the logger and start its flush timer.
    ///
    /// Must be called from within a tokio runtime.
    pub fn build(self) -> Result<ELog> {
        let config = self.config;
        validate_config(&config).map_err(|errors| Error::Config(ConfigError::Validation(errors)))?;
        let runtime = Handle::try_current().map_err(|_| Error::NoRuntime)?;

        std::fs::create_dir_all(&config.directory)?;

        let address = config
            .address
            .clone()
            .unwrap_or_else(|| identity::local_address().to_string());
        let now = self.clock.now();
        let rotator = Rotator::new(
            config.rotation,
            config.prefix.clone(),
            config.directory.clone(),
            address.clone(),
            config.max_size_bytes(),
            &now,
        );

        let stats = Arc::new(TrackingStats::default());
        let collector_id = Arc::new(AtomicU32::new(config.tracking.collector_id));
        let sender = TrackingSender::new(&config.tracking, collector_id.clone(), stats.clone())?;
        let (tracking_tx, tracking_rx) = mpsc::channel(config.tracking.queue_capacity);

        let shared = Arc::new(Shared {
            state: RwLock::new(State {
                rotator,
                buffer: LineBuffer::new(),
                last_flush_ms: epoch_millis(&now),
                keep_in_file: config.keep_in_file,
                keep_in_tracking: false,
                tracking_tx: Some(tracking_tx),
            }),
            tasks: Mutex::new(Tasks {
                pending: Some((sender, tracking_rx)),
                ..Tasks::default()
            }),
            finalizing: tokio::sync::Mutex::new(()),
            mask: config.level_mask(),
            address,
            write_interval_ms: config.write_interval_ms.try_into().unwrap_or(i64::MAX),
            write_buffer_check_bytes: config.write_buffer_check_bytes,
            drain_timeout: Duration::from_millis(config.tracking.drain_timeout_ms),
            clock: self.clock,
            formatter: self.formatter,
            observer: self.observer,
            stats,
            collector_id,
            runtime,
            shutdown: Shutdown::new(),
        });

        let timer = shared.runtime.spawn(timer::run(
            Arc::downgrade(&shared),
            Duration::from_millis(config.tick_interval_ms),
            shared.shutdown.subscribe(),
        ));
        shared.lock_tasks().timer = Some(timer);

        let logger = ELog { shared };
        if config.tracking.enabled {
            logger.set_tracking(true, config.tracking.collector_id);
        }

        tracing::info!(
            file = %logger.current_file().display(),
            rotation = ?config.rotation,
            mask = config.level_mask().bits(),
            "Logger started"
        );
        Ok(logger)
    }
}

impl ELog {
    /// Build a logger with the system clock and the pipe formatter.
    pub fn new(config: LoggerConfig) -> Result<Self> {
        Self::builder(config).build()
    }

    /// Build a logger from the four core settings, everything else defaulted.
    pub fn create(
        prefix: impl Into<String>,
        rotation: RotationMode,
        max_size_kb: u64,
        mask: LevelMask,
    ) -> Result<Self> {
        let mut config = LoggerConfig::new(prefix).with_mask(mask);
        config.rotation = rotation;
        config.max_size_kb = max_size_kb;
        Self::new(config)
    }

    pub fn builder(config: LoggerConfig) -> ELogBuilder {
        ELogBuilder {
            config,
            clock: Arc::new(SystemClock),
            formatter: Arc::new(PipeFormatter),
            observer: None,
        }
    }

    /// Log at fatal level, flush, and exit the process.
    ///
    /// Does nothing when the mask excludes fatal entries.
    #[track_caller]
    pub fn fatal(&self, message: impl fmt::Display) {
        if !self.shared.mask.enables(Level::Fatal) {
            return;
        }
        self.shared.log(Level::Fatal, &message, Location::caller());
        self.flush_now();
        std::process::exit(FATAL_EXIT_CODE);
    }

    /// Log regardless of the mask.
    #[track_caller]
    pub fn vip(&self, message: impl fmt::Display) {
        self.shared.log(Level::Vip, &message, Location::caller());
    }

    #[track_caller]
    pub fn error(&self, message: impl fmt::Display) {
        self.shared.log(Level::Error, &message, Location::caller());
    }

    #[track_caller]
    pub fn info(&self, message: impl fmt::Display) {
        self.shared.log(Level::Info, &message, Location::caller());
    }

    #[track_caller]
    pub fn debug(&self, message: impl fmt::Display) {
        self.shared.log(Level::Debug, &message, Location::caller());
    }

    /// Append an already formatted, terminated line.
    pub fn write_line(&self, line: impl Into<String>) {
        self.shared.write(line.into());
    }

    /// Drain the buffer now.
    pub fn flush_now(&self) {
        let now = self.shared.clock.now();
        let mut state = self.shared.write_state();
        self.shared.rotate_if_due(&mut state, &now);
        self.shared.drain(&mut state, &now);
    }

    /// Start or stop forwarding entries to the collector.
    ///
    /// The sender task is started the first time tracking is enabled.
    /// Has no effect after [`ELog::finalize`].
    pub fn set_tracking(&self, enabled: bool, collector_id: u32) {
        let mut state = self.shared.write_state();
        if state.tracking_tx.is_none() {
            return;
        }
        if enabled {
            self.shared.collector_id.store(collector_id, Ordering::Relaxed);
            self.shared.start_sender();
        }
        state.keep_in_tracking = enabled;
    }

    /// Enable or disable the file sink.
    pub fn set_kept_in_file(&self, enabled: bool) {
        self.shared.write_state().keep_in_file = enabled;
    }

    /// Flush, disable both sinks, close the tracking queue and stop
    /// background tasks. Safe to call more than once; a call that overlaps
    /// another returns only after the first has finished.
    pub async fn finalize(&self) {
        let _finalizing = self.shared.finalizing.lock().await;
        self.shared.shutdown.trigger();
        let (timer, sender) = {
            let mut tasks = self.shared.lock_tasks();
            tasks.pending = None;
            (tasks.timer.take(), tasks.sender.take())
        };

        if let Some(timer) = timer {
            let _ = timer.await;
        }

        {
            let now = self.shared.clock.now();
            let mut state = self.shared.write_state();
            self.shared.rotate_if_due(&mut state, &now);
            self.shared.drain(&mut state, &now);
            state.keep_in_file = false;
            state.keep_in_tracking = false;
            state.tracking_tx = None;
        }

        if let Some(mut sender) = sender {
            if tokio::time::timeout(self.shared.drain_timeout, &mut sender)
                .await
                .is_err()
            {
                tracing::warn!(
                    drain_timeout_ms = self.shared.drain_timeout.as_millis() as u64,
                    "Tracking queue not drained in time, aborting sender"
                );
                sender.abort();
                let _ = sender.await;
            }
        }

        tracing::info!("Logger finalized");
    }

    /// Path of the active log file.
    pub fn current_file(&self) -> PathBuf {
        self.shared.read_state().rotator.path()
    }

    /// Bytes waiting in the buffer.
    pub fn pending_bytes(&self) -> usize {
        self.shared.read_state().buffer.len_bytes()
    }

    pub fn is_kept_in_file(&self) -> bool {
        self.shared.read_state().keep_in_file
    }

    pub fn is_tracking(&self) -> bool {
        self.shared.read_state().keep_in_tracking
    }

    pub fn level_mask(&self) -> LevelMask {
        self.shared.mask
    }

    pub fn tracking_stats(&self) -> TrackingSnapshot {
        self.shared.stats.snapshot()
    }
}

impl fmt::Debug for ELog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ELog")
            .field("file", &self.current_file())
            .field("mask", &self.shared.mask)
            .finish()
    }
}

impl Shared {
    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_tasks(&self) -> std::sync::MutexGuard<'_, Tasks> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn log(&self, level: Level, message: &dyn fmt::Display, location: &'static Location<'static>) {
        if !self.mask.enables(level) {
            return;
        }
        let entry = Entry::new(&self.address, self.clock.now(), location, level, message);
        self.write(self.formatter.format(&entry));
    }

    /// Append, maybe rotate, maybe drain.
    fn write(&self, line: String) {
        let now = self.clock.now();
        let mut state = self.write_state();

        state.buffer.push(line);
        self.rotate_if_due(&mut state, &now);

        let age = epoch_millis(&now) - state.last_flush_ms;
        if age > self.write_interval_ms || state.buffer.len_bytes() > self.write_buffer_check_bytes {
            self.drain(&mut state, &now);
        }
    }

    /// Timer entry: evaluate thresholds without appending.
    pub(crate) fn tick(&self) {
        self.write(String::new());
    }

    fn rotate_if_due(&self, state: &mut State, now: &DateTime<Local>) {
        if !state.keep_in_file || state.buffer.is_empty() {
            return;
        }

        match state.rotator.check(now) {
            Ok(None) => {}
            Ok(Some(Rotation::Renamed { from, to })) => {
                tracing::debug!(from = %from.display(), to = %to.display(), "Moved to new time bucket");
                metrics::record_rotation("time");
            }
            Ok(Some(Rotation::Created)) => {
                metrics::record_rotation("create");
            }
            Ok(Some(Rotation::SizeRolled { backup })) => {
                tracing::debug!(backup = %backup.display(), "Size limit reached, file rolled");
                metrics::record_rotation("size");
                self.runtime.spawn(async move {
                    if let Err(e) = remove_backup(&backup).await {
                        tracing::warn!(backup = %backup.display(), error = %e, "Failed to remove rolled file");
                    }
                });
            }
            Err(failure) => self.report(failure),
        }
    }

    /// Write out and clear the whole buffer.
    fn drain(&self, state: &mut State, now: &DateTime<Local>) {
        if state.buffer.is_empty() {
            return;
        }
        let lines = state.buffer.take();

        if state.keep_in_file {
            let data = concat(&lines);
            match append(&state.rotator.path(), data.as_bytes()) {
                Ok(()) => metrics::record_flush(data.len()),
                Err(failure) => self.report(failure),
            }
        }

        if state.keep_in_tracking {
            if let Some(tx) = &state.tracking_tx {
                for line in lines {
                    tracking::enqueue(tx, line, &self.stats);
                }
            }
        }

        state.last_flush_ms = epoch_millis(now);
    }

    fn start_sender(&self) {
        let mut tasks = self.lock_tasks();
        if let Some((sender, rx)) = tasks.pending.take() {
            tasks.sender = Some(self.runtime.spawn(sender.run(rx)));
        }
    }

    fn report(&self, failure: LogFailure) {
        tracing::error!(error = %failure, "Log sink failure");
        metrics::record_write_failure(failure.kind());
        if let Some(observer) = &self.observer {
            observer(&failure);
        }
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        self.shutdown.trigger();
        let tasks = self.tasks.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(timer) = tasks.timer.take() {
            timer.abort();
        }
    }
}

fn append(path: &Path, data: &[u8]) -> std::result::Result<(), LogFailure> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LogFailure::FileOpen {
            path: path.to_path_buf(),
            source,
        })?;
    file.write_all(data).map_err(|source| LogFailure::FileWrite {
        path: path.to_path_buf(),
        source,
    })
}
