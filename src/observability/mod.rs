//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! HTTP layer and synchronizer produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows into every request span via TraceLayer
//! - Metrics are cheap (atomic increments) and optional

pub mod logging;
pub mod metrics;
