//! Daily check-in subsystem.
//!
//! # Data Flow
//! ```text
//! scheduler.rs (WalletScheduler: cycle loop, pauses, shutdown)
//!     → executor.rs (CheckinExecutor: one wallet, one attempt)
//!         → fees.rs (FeeQuote, balance fitting, gas headroom)
//!         → blockchain::Ledger (status, fees, balance, nonce, broadcast, receipt)
//!         → journal.rs (one line per confirmed check-in)
//!     → outcome.rs (CheckinOutcome per wallet, tallied into CycleReport)
//! ```
//!
//! # Design Decisions
//! - Wallets are processed strictly one after another
//! - A failed attempt is reported and retried next cycle, never within it
//! - Only confirmed, successful check-ins reach the journal

pub mod executor;
pub mod fees;
pub mod journal;
pub mod outcome;
pub mod scheduler;

pub use executor::{CheckinExecutor, ExecutorSettings};
pub use fees::{
    compute_fee_quote, fit_to_balance, gas_limit_with_headroom, AdjustedFee, FeeQuote, FeeTargets,
};
pub use journal::{CheckinJournal, LogEntry};
pub use outcome::{CheckinError, CheckinOutcome};
pub use scheduler::{CycleReport, WalletScheduler};
