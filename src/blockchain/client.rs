//! Blockchain RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - Connect to JSON-RPC endpoint (primary + failovers)
//! - Query chain state (chain id, base fee, balances, nonces, receipts)
//! - Execute read-only contract calls and gas estimates
//! - Broadcast signed transactions
//! - Handle timeouts and network errors gracefully

use alloy::eips::BlockNumberOrTag;
use alloy::network::ReceiptResponse;
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::transports::TransportResult;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, timeout, Instant, MissedTickBehavior};

use crate::blockchain::types::{
    BlockchainConfig, BlockchainError, BlockchainResult, ChainId, ReceiptSummary,
};
use crate::observability::metrics;

type SharedProvider = Arc<dyn Provider + Send + Sync>;

/// Blockchain RPC client wrapper with failover support.
#[derive(Clone)]
pub struct BlockchainClient {
    /// List of providers (primary + failovers).
    providers: Vec<SharedProvider>,
    /// Configuration.
    config: BlockchainConfig,
    /// Request timeout duration.
    timeout_duration: Duration,
}

impl BlockchainClient {
    /// Create a new blockchain client.
    ///
    /// No request is made here; an unreachable endpoint only surfaces on
    /// the first call.
    pub fn new(config: BlockchainConfig) -> BlockchainResult<Self> {
        let timeout_duration = Duration::from_secs(config.rpc_timeout_secs);
        let mut providers = Vec::new();

        // 1. Add primary provider
        let primary_url: url::Url = config.rpc_url.parse().map_err(|e| {
            BlockchainError::Rpc(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;
        let primary = ProviderBuilder::new().connect_http(primary_url);
        providers.push(Arc::new(primary) as SharedProvider);

        // 2. Add failover providers
        for url_str in &config.failover_urls {
            if let Ok(url) = url_str.parse::<url::Url>() {
                let failover = ProviderBuilder::new().connect_http(url);
                providers.push(Arc::new(failover) as SharedProvider);
            } else {
                tracing::warn!(url = %url_str, "Ignoring invalid failover RPC URL");
            }
        }

        tracing::info!(
            rpc_url = %config.rpc_url,
            failovers = providers.len() - 1,
            timeout_secs = config.rpc_timeout_secs,
            "Blockchain client initialized"
        );

        Ok(Self {
            providers,
            config,
            timeout_duration,
        })
    }

    /// Run `call` against each provider in turn until one answers in time.
    async fn with_failover<T, F, Fut>(&self, op: &'static str, call: F) -> BlockchainResult<T>
    where
        F: Fn(SharedProvider) -> Fut,
        Fut: Future<Output = TransportResult<T>>,
    {
        let mut last_error = None;
        for (i, provider) in self.providers.iter().enumerate() {
            match timeout(self.timeout_duration, call(provider.clone())).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => {
                    tracing::warn!(
                        op,
                        provider_idx = i,
                        error = %e,
                        "RPC error, trying next provider"
                    );
                    last_error = Some(BlockchainError::Rpc(e.to_string()));
                }
                Err(_) => {
                    tracing::warn!(op, provider_idx = i, "RPC timeout, trying next provider");
                    last_error = Some(BlockchainError::Timeout(self.config.rpc_timeout_secs));
                }
            }
        }
        metrics::record_rpc_failure(op);
        Err(match last_error {
            // Single endpoint: keep the precise cause.
            Some(e) if self.providers.len() == 1 => e,
            Some(e) => BlockchainError::Rpc(format!("All RPC providers failed to {}: {}", op, e)),
            None => BlockchainError::Rpc(format!("No RPC provider available for {}", op)),
        })
    }

    /// Verify the connected chain ID matches `expected`.
    pub async fn verify_chain_id(&self, expected: u64) -> BlockchainResult<()> {
        let chain_id = self.get_chain_id().await?;
        if chain_id.0 != expected {
            return Err(BlockchainError::ChainMismatch {
                expected,
                actual: chain_id.0,
            });
        }
        Ok(())
    }

    /// Get the chain ID from the RPC.
    pub async fn get_chain_id(&self) -> BlockchainResult<ChainId> {
        self.with_failover("get chain id", |p| async move { p.get_chain_id().await })
            .await
            .map(ChainId)
    }

    /// Base fee per gas of the pending block, `None` when the node doesn't report one.
    pub async fn get_pending_base_fee(&self) -> BlockchainResult<Option<u128>> {
        let block = self
            .with_failover("get pending block", |p| async move {
                p.get_block_by_number(BlockNumberOrTag::Pending).await
            })
            .await?;
        Ok(block.and_then(|b| b.header.base_fee_per_gas).map(u128::from))
    }

    /// Get the balance of an address.
    pub async fn get_balance(&self, address: Address) -> BlockchainResult<U256> {
        self.with_failover("get balance", |p| async move { p.get_balance(address).await })
            .await
    }

    /// Get the transaction count (nonce) for an address.
    pub async fn get_transaction_count(&self, address: Address) -> BlockchainResult<u64> {
        self.with_failover("get transaction count", |p| async move {
            p.get_transaction_count(address).pending().await
        })
        .await
    }

    /// Execute a read-only `eth_call`.
    pub async fn call(&self, request: TransactionRequest) -> BlockchainResult<Bytes> {
        self.with_failover("call", |p| {
            let request = request.clone();
            async move { p.call(request).await }
        })
        .await
    }

    /// Estimate gas units for a call.
    pub async fn estimate_gas(&self, request: TransactionRequest) -> BlockchainResult<u64> {
        self.with_failover("estimate gas", |p| {
            let request = request.clone();
            async move { p.estimate_gas(request).await }
        })
        .await
    }

    /// Broadcast a signed, EIP-2718 encoded transaction.
    pub async fn send_raw_transaction(&self, raw: Bytes) -> BlockchainResult<TxHash> {
        self.with_failover("send raw transaction", |p| {
            let raw = raw.clone();
            async move {
                let pending = p.send_raw_transaction(&raw).await?;
                Ok(*pending.tx_hash())
            }
        })
        .await
    }

    /// Get a transaction receipt by hash.
    pub async fn get_transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> BlockchainResult<Option<ReceiptSummary>> {
        let receipt = self
            .with_failover("get receipt", |p| async move {
                p.get_transaction_receipt(tx_hash).await
            })
            .await?;
        Ok(receipt.map(|r| ReceiptSummary {
            tx_hash,
            success: r.status(),
            gas_used: r.gas_used,
            block_number: r.block_number,
        }))
    }

    /// Poll for a receipt until one appears or `wait` elapses.
    ///
    /// Returns `Ok(None)` when the deadline passes; errors while polling are
    /// logged and polling continues.
    pub async fn wait_for_receipt(
        &self,
        tx_hash: TxHash,
        wait: Duration,
    ) -> BlockchainResult<Option<ReceiptSummary>> {
        // `None` when `wait` is beyond what an Instant can hold: poll until found.
        let deadline = Instant::now().checked_add(wait);
        let mut ticker = interval(Duration::from_millis(self.config.receipt_poll_ms));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                return Ok(None);
            }

            match self.get_transaction_receipt(tx_hash).await {
                Ok(Some(receipt)) => return Ok(Some(receipt)),
                Ok(None) => tracing::debug!(tx_hash = %tx_hash, "Transaction pending"),
                Err(e) => tracing::debug!(tx_hash = %tx_hash, error = %e, "Receipt poll failed"),
            }
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &BlockchainConfig {
        &self.config
    }
}

impl std::fmt::Debug for BlockchainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockchainClient")
            .field("rpc_url", &self.config.rpc_url)
            .field("failovers", &self.config.failover_urls.len())
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> BlockchainConfig {
        BlockchainConfig {
            // Nothing listens on port 1; connection is refused immediately.
            rpc_url: "http://127.0.0.1:1".to_string(),
            failover_urls: Vec::new(),
            chain_id: Some(31337),
            rpc_timeout_secs: 2,
            rpc_retries: 0,
            retry_base_delay_ms: 1,
            retry_max_delay_ms: 1,
            receipt_poll_ms: 50,
        }
    }

    #[test]
    fn test_client_creation() {
        // Construction doesn't touch the network.
        assert!(BlockchainClient::new(test_config()).is_ok());
    }

    #[test]
    fn test_invalid_primary_url() {
        let mut config = test_config();
        config.rpc_url = "not a url".to_string();
        let err = BlockchainClient::new(config).unwrap_err();
        assert!(err.to_string().contains("Invalid RPC URL"));
    }

    #[tokio::test]
    async fn test_rpc_failover() {
        let mut config = test_config();
        config.failover_urls.push("http://127.0.0.1:2".to_string());
        config.failover_urls.push("::invalid::".to_string());

        let client = BlockchainClient::new(config).unwrap();
        assert_eq!(client.providers.len(), 2);

        let result = client.get_chain_id().await;
        assert!(result.unwrap_err().to_string().contains("All RPC providers failed"));
    }

    #[tokio::test]
    async fn test_wait_for_receipt_gives_up() {
        let client = BlockchainClient::new(test_config()).unwrap();
        let receipt = client
            .wait_for_receipt(TxHash::ZERO, Duration::from_millis(120))
            .await
            .unwrap();
        assert!(receipt.is_none());
    }

    #[tokio::test]
    async fn test_wait_for_receipt_with_unbounded_wait() {
        let client = BlockchainClient::new(test_config()).unwrap();
        // Keeps polling instead of overflowing the deadline.
        let result = tokio::time::timeout(
            Duration::from_millis(300),
            client.wait_for_receipt(TxHash::ZERO, Duration::MAX),
        )
        .await;
        assert!(result.is_err());
    }
}
