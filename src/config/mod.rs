//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → LoggerConfig (validated, immutable)
//!     → handed to ELog::new / ELog::builder
//! ```
//!
//! # Design Decisions
//! - Config is immutable once a logger is built; sinks are toggled at runtime
//!   through the logger handle, not by editing config
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::LoggerConfig;
pub use schema::TrackingConfig;
