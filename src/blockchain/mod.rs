//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Environment Variables (private keys, RPC URL)
//!     → wallet.rs (key loading, signing)
//!     → client.rs (RPC connection with timeouts and failover)
//!     → contract.rs (checkIn / hasCheckedInToday encoding)
//!     → ledger.rs (the capability the check-in flow talks to)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts

pub mod client;
pub mod contract;
pub mod ledger;
pub mod types;
pub mod units;
pub mod wallet;

pub use client::BlockchainClient;
pub use ledger::{Ledger, RpcLedger};
pub use types::{BlockchainConfig, BlockchainError, ChainId, ReceiptSummary};
pub use wallet::Wallet;
