//! One wallet's check-in attempt.
//!
//! # Steps
//! ```text
//! hasCheckedInToday? ── yes ──▶ AlreadyDone
//!     │ no
//!     ▼
//! base fee → FeeQuote → gas estimate (+headroom, or fallback) → balance
//!     → fit_to_balance ── insufficient ──▶ InsufficientBalance
//!     ▼
//! nonce → build EIP-1559 request → sign locally → broadcast
//!     → receipt? ── none ──▶ Unconfirmed
//!                ── reverted ──▶ SubmissionFailed
//!                ── success ──▶ Confirmed + journal line
//! ```
//!
//! Each step returns `Result<_, CheckinError>`; the error is folded into a
//! [`CheckinOutcome`] at the end, so a failure only ends this wallet's
//! attempt for this cycle.

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, U256};
use std::time::Duration;

use crate::blockchain::contract;
use crate::blockchain::ledger::Ledger;
use crate::blockchain::units::{format_eth, format_gwei};
use crate::blockchain::wallet::{SignedTransaction, Wallet};
use crate::checkin::fees::{
    compute_fee_quote, fit_to_balance, gas_limit_with_headroom, AdjustedFee, FeeQuote, FeeTargets,
};
use crate::checkin::journal::{CheckinJournal, LogEntry};
use crate::checkin::outcome::{CheckinError, CheckinOutcome};
use crate::config::{CheckinConfig, ConfigError};
use crate::observability::metrics;

/// Everything the executor needs besides the ledger, resolved from config.
#[derive(Debug, Clone)]
pub struct ExecutorSettings {
    pub contract: Address,
    pub referrer: Address,
    pub fees: FeeTargets,
    pub gas_limit_multiplier_bps: u32,
    pub fallback_gas_limit: u64,
    /// `Duration::ZERO` broadcasts without waiting.
    pub receipt_timeout: Duration,
    pub checkin_message: String,
}

impl ExecutorSettings {
    pub fn from_config(config: &CheckinConfig) -> Result<Self, ConfigError> {
        let parse_address = |key: &'static str, value: &str| {
            value.parse::<Address>().map_err(|e| ConfigError::Env {
                key,
                message: format!("'{}': {}", value, e),
            })
        };

        Ok(Self {
            contract: parse_address("CONTRACT_ADDRESS", &config.contract.address)?,
            referrer: parse_address("ZERO_REFERRER", &config.contract.referrer)?,
            fees: FeeTargets::from_config(&config.fees).map_err(|e| ConfigError::Env {
                key: "DESIRED_PRIORITY_GWEI/DESIRED_MAX_GWEI",
                message: e.to_string(),
            })?,
            gas_limit_multiplier_bps: config.fees.gas_limit_multiplier_bps,
            fallback_gas_limit: config.fees.fallback_gas_limit,
            receipt_timeout: config.schedule.receipt_timeout(),
            checkin_message: config.observability.checkin_message.clone(),
        })
    }
}

/// Runs check-in attempts against a [`Ledger`].
pub struct CheckinExecutor<L> {
    ledger: L,
    settings: ExecutorSettings,
    journal: CheckinJournal,
}

impl<L: Ledger> CheckinExecutor<L> {
    pub fn new(ledger: L, settings: ExecutorSettings, journal: CheckinJournal) -> Self {
        Self {
            ledger,
            settings,
            journal,
        }
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Run one attempt for `wallet`. Never fails; problems become outcomes.
    #[tracing::instrument(name = "checkin", skip_all, fields(wallet = %wallet.address()))]
    pub async fn execute(&self, wallet: &Wallet) -> CheckinOutcome {
        let outcome = match self.attempt(wallet).await {
            Ok(outcome) => outcome,
            Err(e) => {
                match &e {
                    CheckinError::InsufficientFunds { .. } => {
                        tracing::warn!(
                            error = %e,
                            "Balance too low for the minimum fee, top up or lower the fee targets"
                        )
                    }
                    CheckinError::ConfirmationTimeout { .. } => {
                        tracing::warn!(error = %e, "Check-in not confirmed in time")
                    }
                    _ => tracing::error!(error = %e, "Check-in attempt failed"),
                }
                e.into()
            }
        };
        metrics::record_outcome(outcome.label());
        outcome
    }

    async fn attempt(&self, wallet: &Wallet) -> Result<CheckinOutcome, CheckinError> {
        let address = wallet.address();

        let already = self
            .ledger
            .has_checked_in_today(address)
            .await
            .map_err(CheckinError::query("hasCheckedInToday"))?;
        if already {
            tracing::info!("Already checked in today, skipping");
            return Ok(CheckinOutcome::AlreadyDone);
        }

        let quote = self.quote_fees().await;
        let gas_limit = self.gas_limit(address).await;

        let balance = self
            .ledger
            .balance(address)
            .await
            .map_err(CheckinError::query("balance"))?;
        tracing::info!(
            balance = %format_eth(balance),
            balance_wei = %balance,
            gas_limit,
            "Wallet balance"
        );

        let max_fee = match fit_to_balance(quote.max_fee, quote.priority_fee, gas_limit, balance) {
            AdjustedFee::Affordable {
                max_fee,
                estimated_cost,
            } => {
                tracing::info!(
                    max_fee_wei = max_fee,
                    max_fee_gwei = %format_gwei(max_fee),
                    estimated_cost = %format_eth(estimated_cost),
                    "Using max fee per gas"
                );
                max_fee
            }
            AdjustedFee::Insufficient { .. } => {
                return Err(CheckinError::InsufficientFunds {
                    balance,
                    required: U256::from(gas_limit) * U256::from(quote.priority_fee),
                });
            }
        };

        let nonce = self
            .ledger
            .nonce(address)
            .await
            .map_err(CheckinError::query("nonce"))?;

        let request =
            contract::check_in_request(self.settings.contract, address, self.settings.referrer)
            .with_nonce(nonce)
            .with_gas_limit(gas_limit)
            .with_max_fee_per_gas(max_fee)
            .with_max_priority_fee_per_gas(quote.priority_fee)
            .with_value(U256::ZERO)
            .with_chain_id(wallet.chain_id());

        let SignedTransaction { tx_hash, raw } = wallet
            .sign_transaction(request)
            .await
            .map_err(|source| CheckinError::Submission { tx_hash: None, source })?;

        let tx_hash = self
            .ledger
            .send_raw_transaction(raw)
            .await
            .map_err(|source| CheckinError::Submission {
                tx_hash: Some(tx_hash),
                source,
            })?;
        tracing::info!(tx_hash = %tx_hash, nonce, "Check-in transaction sent");

        if self.settings.receipt_timeout.is_zero() {
            return Ok(CheckinOutcome::Submitted(tx_hash));
        }

        let receipt = match self
            .ledger
            .wait_for_receipt(tx_hash, self.settings.receipt_timeout)
            .await
        {
            Ok(Some(receipt)) => receipt,
            Ok(None) => return Err(CheckinError::ConfirmationTimeout { tx_hash }),
            Err(e) => {
                tracing::warn!(tx_hash = %tx_hash, error = %e, "Waiting for receipt failed");
                return Err(CheckinError::ConfirmationTimeout { tx_hash });
            }
        };
        tracing::info!(
            tx_hash = %tx_hash,
            success = receipt.success,
            gas_used = receipt.gas_used,
            "Receipt received"
        );

        if !receipt.success {
            return Err(CheckinError::Reverted {
                tx_hash,
                gas_used: receipt.gas_used,
            });
        }

        let entry = LogEntry::now(address, tx_hash, self.settings.checkin_message.clone());
        if let Err(e) = self.journal.append(&entry).await {
            tracing::error!(
                path = %self.journal.path().display(),
                error = %e,
                "Check-in confirmed but writing the log failed"
            );
        }
        tracing::info!(
            tx_hash = %tx_hash,
            message = %self.settings.checkin_message,
            "Check-in succeeded"
        );

        Ok(CheckinOutcome::Confirmed {
            tx_hash,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
        })
    }

    /// Fee quote from the pending base fee; an unknown base fee counts as 0.
    async fn quote_fees(&self) -> FeeQuote {
        let base_fee = match self.ledger.pending_base_fee().await {
            Ok(fee) => fee,
            Err(e) => {
                tracing::warn!(error = %e, "Base fee unavailable, using configured targets");
                0
            }
        };
        let fees = self.settings.fees;
        let quote = compute_fee_quote(base_fee, fees.priority_fee, fees.max_fee);
        tracing::debug!(
            base_fee = quote.base_fee,
            priority_fee = quote.priority_fee,
            max_fee = quote.max_fee,
            "Fee quote"
        );
        quote
    }

    /// Estimated gas plus headroom, or the fallback limit when estimation fails.
    async fn gas_limit(&self, from: Address) -> u64 {
        match self.ledger.estimate_checkin_gas(from, self.settings.referrer).await {
            Ok(0) => {
                tracing::warn!(
                    fallback_gas_limit = self.settings.fallback_gas_limit,
                    "Node estimated zero gas, using fallback gas limit"
                );
                self.settings.fallback_gas_limit
            }
            Ok(estimate) => {
                gas_limit_with_headroom(estimate, self.settings.gas_limit_multiplier_bps)
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    fallback_gas_limit = self.settings.fallback_gas_limit,
                    "Gas estimation failed, using fallback gas limit"
                );
                self.settings.fallback_gas_limit
            }
        }
    }
}
