//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! executor / scheduler / RPC client produce:
//!     → logging.rs (structured tracing events, one span per wallet attempt)
//!     → metrics.rs (outcome counters, cycle histogram, RPC failures)
//!
//! Consumers:
//!     → stdout (fmt layer, filtered by RUST_LOG)
//!     → optional Prometheus scrape endpoint
//! ```
//!
//! # Design Decisions
//! - Metric updates are no-ops until a recorder is installed
//! - Private keys never appear in events or labels

pub mod logging;
pub mod metrics;
