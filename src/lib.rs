//! Buffered, rotating file logger with best-effort remote tracking.

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod logger;
pub mod observability;
pub mod singleton;

pub use config::LoggerConfig;
pub use error::{Error, LogFailure, Result};
pub use logger::level::{Level, LevelMask};
pub use logger::rotation::RotationMode;
pub use logger::{ELog, ELogBuilder};
pub use singleton::Singleton;
