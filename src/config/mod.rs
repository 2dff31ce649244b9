//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults
//!     → optional TOML file (loader.rs, serde)
//!     → .env + process environment (loader.rs overlay)
//!     → validation.rs (semantic checks)
//!     → CheckinConfig (validated, immutable)
//!     → passed explicitly to every component
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup; changes require a restart
//! - All fields have defaults; only `PRIVATE_KEYS` is mandatory
//! - Private keys never live in this structure

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::BlockchainConfig;
pub use schema::CheckinConfig;
pub use schema::ContractConfig;
pub use schema::FeeConfig;
pub use schema::ObservabilityConfig;
pub use schema::ScheduleConfig;
