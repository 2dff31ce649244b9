//! Check-in outcomes and the per-step error taxonomy.

use alloy::primitives::{TxHash, U256};
use thiserror::Error;

use crate::blockchain::types::BlockchainError;

/// What happened to one wallet in one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckinOutcome {
    /// The contract reports the wallet already checked in today.
    AlreadyDone,
    /// The balance can't cover even the priority fee.
    InsufficientBalance { balance: U256, required: U256 },
    /// A read-only query failed; nothing was sent.
    EstimationFailed(String),
    /// Broadcast without waiting for a receipt.
    Submitted(TxHash),
    /// Mined successfully.
    Confirmed {
        tx_hash: TxHash,
        block_number: Option<u64>,
        gas_used: u64,
    },
    /// Signing or broadcast failed, or the transaction reverted.
    SubmissionFailed { tx_hash: Option<TxHash>, reason: String },
    /// Broadcast, but no receipt within the wait window.
    Unconfirmed(TxHash),
}

impl CheckinOutcome {
    /// Short label for metrics and summaries.
    pub fn label(&self) -> &'static str {
        match self {
            CheckinOutcome::AlreadyDone => "already_done",
            CheckinOutcome::InsufficientBalance { .. } => "insufficient_balance",
            CheckinOutcome::EstimationFailed(_) => "estimation_failed",
            CheckinOutcome::Submitted(_) => "submitted",
            CheckinOutcome::Confirmed { .. } => "confirmed",
            CheckinOutcome::SubmissionFailed { .. } => "submission_failed",
            CheckinOutcome::Unconfirmed(_) => "unconfirmed",
        }
    }

    /// Hash of the transaction this outcome refers to, if one was sent.
    pub fn tx_hash(&self) -> Option<TxHash> {
        match self {
            CheckinOutcome::Submitted(h) | CheckinOutcome::Unconfirmed(h) => Some(*h),
            CheckinOutcome::Confirmed { tx_hash, .. } => Some(*tx_hash),
            CheckinOutcome::SubmissionFailed { tx_hash, .. } => *tx_hash,
            _ => None,
        }
    }
}

/// Why an attempt stopped early.
#[derive(Debug, Error)]
pub enum CheckinError {
    /// Status, balance or nonce lookup failed.
    #[error("{step} query failed: {source}")]
    Query {
        step: &'static str,
        #[source]
        source: BlockchainError,
    },

    #[error("balance {balance} wei below minimum cost {required} wei")]
    InsufficientFunds { balance: U256, required: U256 },

    #[error("submission failed: {source}")]
    Submission {
        tx_hash: Option<TxHash>,
        #[source]
        source: BlockchainError,
    },

    #[error("no receipt for {tx_hash}")]
    ConfirmationTimeout { tx_hash: TxHash },

    #[error("transaction {tx_hash} reverted (gas used {gas_used})")]
    Reverted { tx_hash: TxHash, gas_used: u64 },
}

impl CheckinError {
    pub fn query(step: &'static str) -> impl FnOnce(BlockchainError) -> Self {
        move |source| CheckinError::Query { step, source }
    }
}

impl From<CheckinError> for CheckinOutcome {
    fn from(err: CheckinError) -> Self {
        match err {
            CheckinError::Query { .. } => CheckinOutcome::EstimationFailed(err.to_string()),
            CheckinError::InsufficientFunds { balance, required } => {
                CheckinOutcome::InsufficientBalance { balance, required }
            }
            CheckinError::Submission { tx_hash, ref source } => CheckinOutcome::SubmissionFailed {
                tx_hash,
                reason: source.to_string(),
            },
            CheckinError::ConfirmationTimeout { tx_hash } => CheckinOutcome::Unconfirmed(tx_hash),
            CheckinError::Reverted { tx_hash, .. } => CheckinOutcome::SubmissionFailed {
                tx_hash: Some(tx_hash),
                reason: err.to_string(),
            },
        }
    }
}
