//! Conversions between human-readable fee values and wei.

use alloy::primitives::utils::{format_units, parse_units};
use alloy::primitives::U256;

use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// Parse a decimal gwei amount (e.g. `"0.000145106"`) into wei.
///
/// Parsing is exact; values with more than nine fractional digits are
/// rejected rather than rounded.
pub fn gwei_to_wei(gwei: &str) -> BlockchainResult<u128> {
    let trimmed = gwei.trim();
    let parsed = parse_units(trimmed, "gwei")
        .map_err(|e| BlockchainError::Units(format!("Invalid gwei amount '{}': {}", trimmed, e)))?;
    if parsed.is_negative() {
        return Err(BlockchainError::Units(format!(
            "Negative gwei amount '{}'",
            trimmed
        )));
    }
    u128::try_from(parsed.get_absolute())
        .map_err(|_| BlockchainError::Units(format!("Gwei amount '{}' out of range", trimmed)))
}

/// Render wei as gwei for diagnostics.
pub fn format_gwei(wei: u128) -> String {
    format_units(U256::from(wei), "gwei").unwrap_or_else(|_| format!("{} wei", wei))
}

/// Render a balance or cost in ether with twelve decimals, e.g. `0.000099900000 ETH`.
pub fn format_eth(wei: U256) -> String {
    let ether = format_units(wei, "ether").unwrap_or_else(|_| wei.to_string());
    let (int_part, frac_part) = ether.split_once('.').unwrap_or((ether.as_str(), ""));
    let mut frac: String = frac_part.chars().take(12).collect();
    while frac.len() < 12 {
        frac.push('0');
    }
    format!("{}.{} ETH", int_part, frac)
}
