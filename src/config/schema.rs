//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.
//! Private keys are deliberately absent: they only ever come from the
//! environment (see `blockchain::wallet`).

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the check-in keeper.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CheckinConfig {
    /// RPC endpoints and query behaviour.
    pub blockchain: BlockchainConfig,

    /// Target contract settings.
    pub contract: ContractConfig,

    /// Fee targets and gas limit policy.
    pub fees: FeeConfig,

    /// Timing of the wallet loop.
    pub schedule: ScheduleConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Blockchain RPC configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BlockchainConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs.
    pub failover_urls: Vec<String>,

    /// Expected chain ID. When unset it is read from the RPC at startup.
    pub chain_id: Option<u64>,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Extra attempts for read-only queries.
    pub rpc_retries: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub retry_base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub retry_max_delay_ms: u64,

    /// Receipt polling interval in milliseconds.
    pub receipt_poll_ms: u64,
}

impl Default for BlockchainConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://rpc.soneium.org".to_string(),
            failover_urls: Vec::new(),
            chain_id: None,
            rpc_timeout_secs: 10,
            rpc_retries: 2,
            retry_base_delay_ms: 500,
            retry_max_delay_ms: 4000,
            receipt_poll_ms: 2000,
        }
    }
}

/// Check-in contract configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContractConfig {
    /// Address of the check-in contract.
    pub address: String,

    /// Referrer passed to every `checkIn` call.
    pub referrer: String,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            address: "0x21Be1D69A77eA5882aCcD5c5319Feb7AC3854751".to_string(),
            referrer: "0x0000000000000000000000000000000000000000".to_string(),
        }
    }
}

/// Fee targets, as decimal gwei strings to keep them exact.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FeeConfig {
    /// Desired priority fee per gas, in gwei.
    pub priority_gwei: String,

    /// Ceiling for the max fee per gas, in gwei. `0` disables the ceiling.
    pub max_gwei: String,

    /// Headroom applied to the gas estimate, in basis points (10000 = 100%).
    pub gas_limit_multiplier_bps: u32,

    /// Gas limit used when estimation fails.
    pub fallback_gas_limit: u64,
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            priority_gwei: "0.000145106".to_string(),
            max_gwei: "0.001349".to_string(),
            gas_limit_multiplier_bps: 10_500,
            fallback_gas_limit: 150_000,
        }
    }
}

/// Wallet loop timing.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Pause between two wallets of the same cycle, in seconds.
    pub wallet_delay_secs: u64,

    /// Sleep after a finished cycle, in seconds (24h + 1min by default).
    pub cycle_interval_secs: u64,

    /// How long to wait for a receipt. `0` submits without waiting.
    pub receipt_timeout_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            wallet_delay_secs: 10,
            cycle_interval_secs: 86_400 + 60,
            receipt_timeout_secs: 120,
        }
    }
}

impl ScheduleConfig {
    pub fn wallet_delay(&self) -> Duration {
        Duration::from_secs(self.wallet_delay_secs)
    }

    pub fn cycle_interval(&self) -> Duration {
        Duration::from_secs(self.cycle_interval_secs)
    }

    pub fn receipt_timeout(&self) -> Duration {
        Duration::from_secs(self.receipt_timeout_secs)
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default log filter when `RUST_LOG` is unset.
    pub log_level: String,

    /// Append-only log of successful check-ins.
    pub checkin_log: String,

    /// Message written after every successful check-in.
    pub checkin_message: String,

    /// Prometheus exporter bind address; disabled when unset.
    pub metrics_address: Option<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "checkin_keeper=info".to_string(),
            checkin_log: "checkin_log.txt".to_string(),
            checkin_message: "check-in complete".to_string(),
            metrics_address: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CheckinConfig::default();
        assert_eq!(config.fees.fallback_gas_limit, 150_000);
        assert_eq!(config.fees.gas_limit_multiplier_bps, 10_500);
        assert_eq!(config.schedule.cycle_interval(), Duration::from_secs(86_460));
        assert_eq!(config.schedule.wallet_delay(), Duration::from_secs(10));
        assert_eq!(config.schedule.receipt_timeout(), Duration::from_secs(120));
        assert!(config.observability.metrics_address.is_none());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: CheckinConfig = toml::from_str(
            r#"
            [blockchain]
            rpc_url = "http://localhost:8545"
            chain_id = 31337

            [schedule]
            wallet_delay_secs = 0
            "#,
        )
        .unwrap();

        assert_eq!(config.blockchain.rpc_url, "http://localhost:8545");
        assert_eq!(config.blockchain.chain_id, Some(31337));
        assert_eq!(config.blockchain.rpc_timeout_secs, 10);
        assert_eq!(config.schedule.wallet_delay_secs, 0);
        assert_eq!(config.schedule.cycle_interval_secs, 86_460);
        assert_eq!(config.fees.priority_gwei, "0.000145106");
    }
}
