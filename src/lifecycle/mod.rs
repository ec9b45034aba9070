//! Lifecycle management for logger background tasks.
//!
//! # Data Flow
//! ```text
//! ELog::new → Shutdown::new → timer subscribes
//! ELog::finalize / drop → Shutdown::trigger → timer exits
//! ```

pub mod shutdown;

pub use shutdown::Shutdown;
