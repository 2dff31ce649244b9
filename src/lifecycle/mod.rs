//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config → RPC client → chain ID → wallets → executor → scheduler
//!
//! Shutdown (shutdown.rs):
//!     Signal received → broadcast → scheduler stops before the next wallet
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - An attempt already in flight is allowed to finish

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use signals::spawn_signal_handler;
pub use startup::build_scheduler;
