//! Observability of the logger itself.
//!
//! # Data Flow
//! ```text
//! Logger internals produce:
//!     → logging.rs (tracing subscriber for diagnostics and sink failures)
//!     → metrics.rs (flush, rotation, failure and tracking counters)
//! ```
//!
//! # Design Decisions
//! - Diagnostics go through `tracing`, never through the logger being observed
//! - Metrics are cheap (no-ops until a recorder is installed)

pub mod logging;
pub mod metrics;
