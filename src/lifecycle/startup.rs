//! Startup orchestration.
//!
//! # Responsibilities
//! - Connect the RPC client and settle the chain ID
//! - Turn private keys into wallets
//! - Wire ledger, executor and scheduler together
//!
//! Any error here is fatal and surfaces as a [`ConfigError`].

use crate::blockchain::client::BlockchainClient;
use crate::blockchain::ledger::RpcLedger;
use crate::blockchain::wallet::{keys_from_env, load_wallets};
use crate::checkin::executor::{CheckinExecutor, ExecutorSettings};
use crate::checkin::journal::CheckinJournal;
use crate::checkin::scheduler::WalletScheduler;
use crate::config::{CheckinConfig, ConfigError};

/// Build a scheduler from config and the keys in `PRIVATE_KEYS`.
pub async fn build_scheduler(
    config: &CheckinConfig,
) -> Result<WalletScheduler<RpcLedger>, ConfigError> {
    let keys = keys_from_env().ok_or(ConfigError::MissingKeys)?;
    build_scheduler_with_keys(config, &keys).await
}

pub async fn build_scheduler_with_keys(
    config: &CheckinConfig,
    keys: &[String],
) -> Result<WalletScheduler<RpcLedger>, ConfigError> {
    if keys.is_empty() {
        return Err(ConfigError::MissingKeys);
    }
    let settings = ExecutorSettings::from_config(config)?;

    let client = BlockchainClient::new(config.blockchain.clone())
        .map_err(|e| ConfigError::Chain(e.to_string()))?;
    let chain_id = resolve_chain_id(&client, config.blockchain.chain_id).await?;
    tracing::info!(
        rpc_url = %config.blockchain.rpc_url,
        failovers = config.blockchain.failover_urls.len(),
        chain_id,
        "Connected to RPC"
    );

    let wallets = load_wallets(keys, chain_id);
    if wallets.is_empty() {
        return Err(ConfigError::NoValidWallets);
    }

    let ledger = RpcLedger::new(client, settings.contract);
    let journal = CheckinJournal::new(&config.observability.checkin_log);
    tracing::info!(
        contract = %settings.contract,
        referrer = %settings.referrer,
        priority_fee_wei = settings.fees.priority_fee,
        max_fee_wei = settings.fees.max_fee,
        checkin_log = %journal.path().display(),
        "Check-in settings"
    );

    WalletScheduler::new(
        CheckinExecutor::new(ledger, settings, journal),
        wallets,
        config.schedule.clone(),
    )
}

/// Verify a configured chain ID, or ask the node for one.
async fn resolve_chain_id(
    client: &BlockchainClient,
    configured: Option<u64>,
) -> Result<u64, ConfigError> {
    match configured {
        Some(expected) => {
            client
                .verify_chain_id(expected)
                .await
                .map_err(|e| ConfigError::Chain(e.to_string()))?;
            Ok(expected)
        }
        None => client
            .get_chain_id()
            .await
            .map(u64::from)
            .map_err(|e| ConfigError::Chain(format!("could not fetch chain ID: {}", e))),
    }
}
