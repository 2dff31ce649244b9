//! Daily on-chain check-in keeper.

pub mod blockchain;
pub mod checkin;
pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use checkin::{CheckinExecutor, CheckinOutcome, WalletScheduler};
pub use config::schema::CheckinConfig;
pub use lifecycle::Shutdown;
