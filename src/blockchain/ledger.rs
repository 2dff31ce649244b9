//! The ledger capability consumed by the check-in flow.
//!
//! Everything that touches the network goes through [`Ledger`], so the
//! executor can be driven by a mock in tests.

use alloy::primitives::{Address, Bytes, TxHash, U256};
use async_trait::async_trait;
use std::time::Duration;

use crate::blockchain::client::BlockchainClient;
use crate::blockchain::contract;
use crate::blockchain::types::{BlockchainResult, ReceiptSummary};
use crate::resilience::{retry_with_backoff, RetryPolicy};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Ledger: Send + Sync {
    /// `hasCheckedInToday(wallet)` on the check-in contract.
    async fn has_checked_in_today(&self, wallet: Address) -> BlockchainResult<bool>;

    /// Base fee of the pending block; `0` when the node reports none.
    async fn pending_base_fee(&self) -> BlockchainResult<u128>;

    /// Gas units `checkIn(referrer)` would use when sent from `from`.
    async fn estimate_checkin_gas(&self, from: Address, referrer: Address) -> BlockchainResult<u64>;

    async fn balance(&self, address: Address) -> BlockchainResult<U256>;

    async fn nonce(&self, address: Address) -> BlockchainResult<u64>;

    /// Broadcast an already signed transaction.
    async fn send_raw_transaction(&self, raw: Bytes) -> BlockchainResult<TxHash>;

    /// Wait up to `wait` for a receipt; `None` when nothing showed up.
    async fn wait_for_receipt(
        &self,
        tx_hash: TxHash,
        wait: Duration,
    ) -> BlockchainResult<Option<ReceiptSummary>>;
}

/// [`Ledger`] backed by JSON-RPC.
///
/// Read-only queries are retried under `retry`; broadcasts are sent once.
#[derive(Debug, Clone)]
pub struct RpcLedger {
    client: BlockchainClient,
    contract: Address,
    retry: RetryPolicy,
}

impl RpcLedger {
    pub fn new(client: BlockchainClient, contract: Address) -> Self {
        let config = client.config();
        let retry = RetryPolicy {
            max_retries: config.rpc_retries,
            base_delay_ms: config.retry_base_delay_ms,
            max_delay_ms: config.retry_max_delay_ms,
        };
        Self {
            client,
            contract,
            retry,
        }
    }
}

#[async_trait]
impl Ledger for RpcLedger {
    async fn has_checked_in_today(&self, wallet: Address) -> BlockchainResult<bool> {
        let request = contract::has_checked_in_today_request(self.contract, wallet);
        let output = retry_with_backoff(&self.retry, "hasCheckedInToday", || {
            self.client.call(request.clone())
        })
        .await?;
        contract::decode_has_checked_in_today(&output)
    }

    async fn pending_base_fee(&self) -> BlockchainResult<u128> {
        let base_fee = retry_with_backoff(&self.retry, "pending base fee", || {
            self.client.get_pending_base_fee()
        })
        .await?;
        Ok(base_fee.unwrap_or(0))
    }

    async fn estimate_checkin_gas(
        &self,
        from: Address,
        referrer: Address,
    ) -> BlockchainResult<u64> {
        let request = contract::check_in_request(self.contract, from, referrer);
        retry_with_backoff(&self.retry, "estimate gas", || {
            self.client.estimate_gas(request.clone())
        })
        .await
    }

    async fn balance(&self, address: Address) -> BlockchainResult<U256> {
        retry_with_backoff(&self.retry, "balance", || self.client.get_balance(address)).await
    }

    async fn nonce(&self, address: Address) -> BlockchainResult<u64> {
        retry_with_backoff(&self.retry, "nonce", || {
            self.client.get_transaction_count(address)
        })
        .await
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> BlockchainResult<TxHash> {
        self.client.send_raw_transaction(raw).await
    }

    async fn wait_for_receipt(
        &self,
        tx_hash: TxHash,
        wait: Duration,
    ) -> BlockchainResult<Option<ReceiptSummary>> {
        self.client.wait_for_receipt(tx_hash, wait).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::types::BlockchainConfig;

    fn unreachable_ledger() -> RpcLedger {
        let config = BlockchainConfig {
            rpc_url: "http://127.0.0.1:1".to_string(),
            rpc_timeout_secs: 2,
            rpc_retries: 1,
            retry_base_delay_ms: 1,
            retry_max_delay_ms: 2,
            ..BlockchainConfig::default()
        };
        RpcLedger::new(BlockchainClient::new(config).unwrap(), Address::repeat_byte(0x21))
    }

    #[test]
    fn test_retry_policy_from_config() {
        let ledger = unreachable_ledger();
        assert_eq!(ledger.retry.max_retries, 1);
        assert_eq!(ledger.retry.base_delay_ms, 1);
    }

    #[tokio::test]
    async fn test_query_errors_surface_after_retries() {
        let ledger = unreachable_ledger();
        assert!(ledger.balance(Address::ZERO).await.is_err());
        assert!(ledger.has_checked_in_today(Address::ZERO).await.is_err());
    }
}
