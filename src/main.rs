//! Demo driver for the elog logger.
//!
//! Builds the process-wide stat logger through a static [`Singleton`],
//! writes a sample entry and finalizes.
//!
//! ```text
//! elog-demo --dir /tmp/logs --prefix stat_logger
//! elog-demo --tracking-url "http://collector:8080/stat?guid=tracking"
//! elog-demo --fatal            # flushes, then exits with status 1
//! elog-demo --mask 2           # error entries only
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::OnceLock;

use clap::Parser;

use elog::config::load_config;
use elog::observability::{logging::init_logging, metrics::init_metrics};
use elog::{ELog, LevelMask, LoggerConfig, RotationMode, Singleton};

#[derive(Parser)]
#[command(name = "elog-demo")]
#[command(about = "Write sample entries through the buffered rotating logger", long_about = None)]
struct Cli {
    /// TOML logger configuration.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the file prefix.
    #[arg(long)]
    prefix: Option<String>,

    /// Override the log directory.
    #[arg(long)]
    dir: Option<PathBuf>,

    /// Enable tracking to this collector URL.
    #[arg(long)]
    tracking_url: Option<String>,

    /// Serve Prometheus metrics on this address.
    #[arg(long)]
    metrics_address: Option<SocketAddr>,

    /// Level mask as raw bits: 1 fatal, 2 error, 4 info, 8 debug.
    #[arg(long)]
    mask: Option<u8>,

    /// Finish with a fatal entry.
    #[arg(long)]
    fatal: bool,
}

static SETTINGS: OnceLock<LoggerConfig> = OnceLock::new();
static STAT_LOGGER: Singleton<ELog, elog::Error> = Singleton::new(new_stat_logger);

fn default_settings() -> LoggerConfig {
    let mut config =
        LoggerConfig::new("stat_logger").with_mask(LevelMask::FATAL | LevelMask::ERROR | LevelMask::INFO);
    config.rotation = RotationMode::Day;
    config.max_size_kb = 2 * 1024 * 1024;
    config
}

fn new_stat_logger() -> elog::Result<ELog> {
    let config = SETTINGS.get().cloned().unwrap_or_else(default_settings);
    let logger = ELog::new(config)?;
    logger.set_kept_in_file(true);
    Ok(logger)
}

fn stat_logger() -> Result<&'static ELog, &'static elog::Error> {
    STAT_LOGGER.get()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging("elog=debug");

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => default_settings(),
    };
    if let Some(prefix) = cli.prefix {
        config.prefix = prefix;
    }
    if let Some(dir) = cli.dir {
        config.directory = dir;
    }
    if let Some(bits) = cli.mask {
        config = config.with_mask(LevelMask::from_bits(bits));
    }
    if let Some(url) = cli.tracking_url {
        config.tracking.url = url;
        config.tracking.enabled = true;
    }
    if let Some(addr) = cli.metrics_address {
        init_metrics(addr);
    }

    tracing::info!(
        prefix = %config.prefix,
        directory = %config.directory.display(),
        rotation = ?config.rotation,
        tracking = config.tracking.enabled,
        "Configuration loaded"
    );
    let _ = SETTINGS.set(config);

    let logger = stat_logger().map_err(|e| e.to_string())?;

    logger.info(format_args!(
        "this is logger test|int|{}|string|{}|float32|{}|struct|etc.",
        100, "hello", 20.15
    ));
    logger.vip("demo finished writing samples");

    if cli.fatal {
        logger.fatal("fatal requested from the command line");
    }

    logger.finalize().await;
    tracing::info!(file = %logger.current_file().display(), "Shutdown complete");
    Ok(())
}
