//! Fee computation and balance fitting.
//!
//! Pure functions; every amount is wei (per gas unless noted).

use alloy::primitives::U256;

use crate::blockchain::types::BlockchainResult;
use crate::blockchain::units::gwei_to_wei;
use crate::config::FeeConfig;

/// Configured fee targets converted to wei.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeTargets {
    pub priority_fee: u128,
    /// `0` means no ceiling.
    pub max_fee: u128,
}

impl FeeTargets {
    pub fn from_config(config: &FeeConfig) -> BlockchainResult<Self> {
        Ok(Self {
            priority_fee: gwei_to_wei(&config.priority_gwei)?,
            max_fee: gwei_to_wei(&config.max_gwei)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeQuote {
    /// Observed base fee, `0` when unknown.
    pub base_fee: u128,
    pub priority_fee: u128,
    pub max_fee: u128,
}

/// Derive EIP-1559 fee fields from the observed base fee and the targets.
///
/// With a known base fee the max fee is `base + 2 × priority`, never below
/// the priority fee and capped by `configured_max` when that is non-zero.
/// Without one, `configured_max` is used as is, or `3 × priority` when no
/// ceiling is configured.
pub fn compute_fee_quote(
    observed_base_fee: u128,
    priority_fee: u128,
    configured_max: u128,
) -> FeeQuote {
    let max_fee = if observed_base_fee > 0 {
        let candidate = observed_base_fee
            .saturating_add(priority_fee.saturating_mul(2))
            .max(priority_fee);
        if configured_max > 0 {
            candidate.min(configured_max)
        } else {
            candidate
        }
    } else if configured_max > 0 {
        configured_max
    } else {
        priority_fee.saturating_mul(3)
    };

    FeeQuote {
        base_fee: observed_base_fee,
        priority_fee,
        max_fee,
    }
}

/// Result of fitting a max fee to a wallet balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjustedFee {
    /// `estimated_cost = gas_limit × max_fee ≤ balance`.
    Affordable { max_fee: u128, estimated_cost: U256 },
    /// Even the priority fee alone exceeds the balance.
    Insufficient { estimated_cost: U256 },
}

/// Lower `max_fee` until `gas_limit × max_fee` fits in `balance`.
///
/// The fee is never lowered below `priority_fee`; if that would be needed
/// the attempt is reported as [`AdjustedFee::Insufficient`].
pub fn fit_to_balance(
    max_fee: u128,
    priority_fee: u128,
    gas_limit: u64,
    balance: U256,
) -> AdjustedFee {
    let gas = U256::from(gas_limit);
    let estimated_cost = gas.saturating_mul(U256::from(max_fee));
    if estimated_cost <= balance {
        return AdjustedFee::Affordable {
            max_fee,
            estimated_cost,
        };
    }

    // cost > balance ≥ 0 implies gas_limit > 0
    let affordable = balance / gas;
    if affordable < U256::from(priority_fee) {
        return AdjustedFee::Insufficient { estimated_cost };
    }

    // affordable < max_fee here, so it fits in u128
    AdjustedFee::Affordable {
        max_fee: affordable.saturating_to::<u128>(),
        estimated_cost: gas * affordable,
    }
}

/// `ceil(estimate × multiplier_bps / 10000)`.
pub fn gas_limit_with_headroom(estimate: u64, multiplier_bps: u32) -> u64 {
    let scaled = (u128::from(estimate) * u128::from(multiplier_bps)).div_ceil(10_000);
    u64::try_from(scaled).unwrap_or(u64::MAX)
}
