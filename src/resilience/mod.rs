//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Read-only RPC query:
//!     → client.rs failover round (every provider once, each under a timeout)
//!     → On failure: retries.rs (retry the round with backoff)
//!     → backoff.rs (exponential delay with jitter)
//! ```
//!
//! # Design Decisions
//! - Every external call has a deadline
//! - Retries only for read-only queries; broadcasts are never repeated
//! - Jittered backoff keeps several keepers from hammering one endpoint

pub mod backoff;
pub mod retries;

pub use retries::{retry_with_backoff, RetryPolicy};
