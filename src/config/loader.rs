//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::config::schema::CheckinConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading and startup checks.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Env { key: &'static str, message: String },
    Validation(Vec<ValidationError>),
    /// `PRIVATE_KEYS` is unset or empty.
    MissingKeys,
    /// Keys were given but none of them parsed.
    NoValidWallets,
    /// The chain ID could not be determined or did not match.
    Chain(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Env { key, message } => write!(f, "Invalid {}: {}", key, message),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
            ConfigError::MissingKeys => {
                write!(f, "PRIVATE_KEYS is not set (comma-separated private keys required)")
            }
            ConfigError::NoValidWallets => write!(f, "No valid private keys found"),
            ConfigError::Chain(msg) => write!(f, "Chain error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load configuration: defaults, then the optional TOML file, then `.env`
/// and the process environment. The result is validated.
pub fn load_config(path: Option<&Path>) -> Result<CheckinConfig, ConfigError> {
    // Variables already set in the process win over `.env`.
    let _ = dotenv::dotenv();

    let config = match path {
        Some(path) => load_file(path)?,
        None => CheckinConfig::default(),
    };
    let config = apply_env_overrides(config, |key| std::env::var(key).ok())?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Parse a TOML file without applying environment overrides.
pub fn load_file(path: &Path) -> Result<CheckinConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    toml::from_str(&content).map_err(ConfigError::Parse)
}

/// Overlay environment-style keys on top of `config`.
///
/// `lookup` abstracts the environment so tests don't touch process state.
/// Empty values are treated as unset.
pub fn apply_env_overrides<F>(
    mut config: CheckinConfig,
    lookup: F,
) -> Result<CheckinConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    if let Some(v) = get("RPC_URL") {
        config.blockchain.rpc_url = v;
    }
    if let Some(v) = get("RPC_FAILOVER_URLS") {
        config.blockchain.failover_urls = v
            .split(',')
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(str::to_string)
            .collect();
    }
    if let Some(v) = get("CHAIN_ID") {
        config.blockchain.chain_id = Some(parse_env("CHAIN_ID", &v)?);
    }
    if let Some(v) = get("RPC_TIMEOUT_SECS") {
        config.blockchain.rpc_timeout_secs = parse_env("RPC_TIMEOUT_SECS", &v)?;
    }
    if let Some(v) = get("RPC_RETRIES") {
        config.blockchain.rpc_retries = parse_env("RPC_RETRIES", &v)?;
    }

    if let Some(v) = get("CONTRACT_ADDRESS") {
        config.contract.address = v;
    }
    if let Some(v) = get("ZERO_REFERRER") {
        config.contract.referrer = v;
    }

    if let Some(v) = get("DESIRED_PRIORITY_GWEI") {
        config.fees.priority_gwei = v;
    }
    if let Some(v) = get("DESIRED_MAX_GWEI") {
        config.fees.max_gwei = v;
    }
    if let Some(v) = get("GAS_LIMIT_MULTIPLIER_BPS") {
        config.fees.gas_limit_multiplier_bps = parse_env("GAS_LIMIT_MULTIPLIER_BPS", &v)?;
    }
    if let Some(v) = get("FALLBACK_GAS_LIMIT") {
        config.fees.fallback_gas_limit = parse_env("FALLBACK_GAS_LIMIT", &v)?;
    }

    if let Some(v) = get("RECEIPT_TIMEOUT_SECS") {
        config.schedule.receipt_timeout_secs = parse_env("RECEIPT_TIMEOUT_SECS", &v)?;
    }
    if let Some(v) = get("WALLET_DELAY_SECS") {
        config.schedule.wallet_delay_secs = parse_env("WALLET_DELAY_SECS", &v)?;
    }
    if let Some(v) = get("CYCLE_INTERVAL_SECS") {
        config.schedule.cycle_interval_secs = parse_env("CYCLE_INTERVAL_SECS", &v)?;
    }

    if let Some(v) = get("CHECKIN_LOG") {
        config.observability.checkin_log = v;
    }
    if let Some(v) = get("CHECKIN_MESSAGE") {
        config.observability.checkin_message = v;
    }
    if let Some(v) = get("METRICS_ADDRESS") {
        config.observability.metrics_address = Some(v);
    }

    Ok(config)
}

fn parse_env<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| ConfigError::Env {
        key,
        message: format!("'{}': {}", value, e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_env_overrides() {
        let config = apply_env_overrides(
            CheckinConfig::default(),
            env(&[
                ("RPC_URL", "http://localhost:8545"),
                ("RPC_FAILOVER_URLS", "http://a:8545, ,http://b:8545"),
                ("CHAIN_ID", "31337"),
                ("DESIRED_PRIORITY_GWEI", "0.0001"),
                ("DESIRED_MAX_GWEI", "0"),
                ("WALLET_DELAY_SECS", "3"),
                ("CHECKIN_LOG", "/tmp/checkins.txt"),
            ]),
        )
        .unwrap();

        assert_eq!(config.blockchain.rpc_url, "http://localhost:8545");
        assert_eq!(config.blockchain.failover_urls, vec!["http://a:8545", "http://b:8545"]);
        assert_eq!(config.blockchain.chain_id, Some(31337));
        assert_eq!(config.fees.priority_gwei, "0.0001");
        assert_eq!(config.fees.max_gwei, "0");
        assert_eq!(config.schedule.wallet_delay_secs, 3);
        assert_eq!(config.observability.checkin_log, "/tmp/checkins.txt");
        // untouched
        assert_eq!(config.schedule.cycle_interval_secs, 86_460);
    }

    #[test]
    fn test_empty_values_are_ignored() {
        let lookup = env(&[("RPC_URL", "  "), ("CHAIN_ID", "")]);
        let config = apply_env_overrides(CheckinConfig::default(), lookup).unwrap();
        assert_eq!(config.blockchain.rpc_url, "https://rpc.soneium.org");
        assert!(config.blockchain.chain_id.is_none());
    }

    #[test]
    fn test_bad_number_names_the_key() {
        let lookup = env(&[("WALLET_DELAY_SECS", "ten")]);
        let err = apply_env_overrides(CheckinConfig::default(), lookup).unwrap_err();
        assert!(err.to_string().contains("WALLET_DELAY_SECS"));
    }

    #[test]
    fn test_load_file_then_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checkin.toml");
        fs::write(
            &path,
            "[schedule]\nwallet_delay_secs = 1\nreceipt_timeout_secs = 30\n",
        )
        .unwrap();

        let config = load_file(&path).unwrap();
        let config = apply_env_overrides(config, env(&[("RECEIPT_TIMEOUT_SECS", "0")])).unwrap();
        assert_eq!(config.schedule.wallet_delay_secs, 1);
        assert_eq!(config.schedule.receipt_timeout_secs, 0);
    }

    #[test]
    fn test_missing_file() {
        let err = load_file(Path::new("/nonexistent/checkin.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
