//! Crate-level error types.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::loader::ConfigError;

/// Errors returned while building or driving a logger.
#[derive(Debug, Error)]
pub enum Error {
    /// Log directory could not be prepared.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration failed to load or validate.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The logger was built outside a tokio runtime.
    #[error("no tokio runtime available to host background tasks")]
    NoRuntime,

    /// The tracking endpoint is not a valid URL.
    #[error("invalid tracking URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The tracking HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type for logger construction and control.
pub type Result<T> = std::result::Result<T, Error>;

/// A failure observed on the write path.
///
/// These never surface to the caller of an entry point. They go to the
/// console channel (`tracing`) and to the optional error observer.
#[derive(Debug, Error)]
pub enum LogFailure {
    #[error("failed to open {path}: {source}")]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to rotate {path}: {source}")]
    Rotate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LogFailure {
    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            LogFailure::FileOpen { .. } => "open",
            LogFailure::FileWrite { .. } => "write",
            LogFailure::Rotate { .. } => "rotate",
        }
    }
}
