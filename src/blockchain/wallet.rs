//! Wallet management and transaction signing.
//!
//! # Security
//! - Private keys are loaded ONLY from environment variables
//! - Keys are never logged or serialized

use alloy::eips::eip2718::Encodable2718;
use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes, TxHash};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use std::collections::HashSet;

use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// Environment variable holding the comma-separated private keys.
pub const PRIVATE_KEYS_ENV_VAR: &str = "PRIVATE_KEYS";

/// A signing identity taking part in the daily check-in.
#[derive(Debug, Clone)]
pub struct Wallet {
    /// The underlying signer (private key).
    signer: PrivateKeySigner,
    /// Chain ID for EIP-155 replay protection.
    chain_id: u64,
}

/// A signed, EIP-2718 encoded transaction ready for broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub tx_hash: TxHash,
    pub raw: Bytes,
}

impl Wallet {
    /// Create a wallet from a hex-encoded private key string.
    ///
    /// # Arguments
    /// * `private_key_hex` - Hex string (with or without 0x prefix)
    /// * `chain_id` - Chain ID for transaction signing
    pub fn from_private_key(private_key_hex: &str, chain_id: u64) -> BlockchainResult<Self> {
        let key_hex = private_key_hex.trim();
        let key_hex = key_hex.strip_prefix("0x").unwrap_or(key_hex);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| BlockchainError::Wallet(format!("Invalid private key format: {}", e)))?;

        Ok(Self { signer, chain_id })
    }

    /// Get the wallet's address.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Get the chain ID this wallet is configured for.
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Sign a fully populated transaction request.
    ///
    /// The request must carry nonce, gas limit and both EIP-1559 fee fields;
    /// nothing is fetched from the network here.
    pub async fn sign_transaction(
        &self,
        request: TransactionRequest,
    ) -> BlockchainResult<SignedTransaction> {
        let request = request.with_from(self.address()).with_chain_id(self.chain_id);
        let envelope = request
            .build(&EthereumWallet::from(self.signer.clone()))
            .await
            .map_err(|e| BlockchainError::Signing(e.to_string()))?;

        Ok(SignedTransaction {
            tx_hash: *envelope.tx_hash(),
            raw: envelope.encoded_2718().into(),
        })
    }
}

/// Split a comma-separated key list, dropping blank entries.
pub fn split_keys(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read the raw key list from `PRIVATE_KEYS`.
///
/// Returns `None` when the variable is unset or holds no keys.
pub fn keys_from_env() -> Option<Vec<String>> {
    let raw = std::env::var(PRIVATE_KEYS_ENV_VAR).ok()?;
    let keys = split_keys(&raw);
    if keys.is_empty() {
        None
    } else {
        Some(keys)
    }
}

/// Build wallets from raw keys, skipping invalid and duplicate entries.
///
/// Order of the input list is preserved; it is also the check-in order.
pub fn load_wallets(keys: &[String], chain_id: u64) -> Vec<Wallet> {
    let mut seen = HashSet::new();
    let mut wallets = Vec::with_capacity(keys.len());

    for (idx, key) in keys.iter().enumerate() {
        match Wallet::from_private_key(key, chain_id) {
            Ok(wallet) => {
                if !seen.insert(wallet.address()) {
                    tracing::warn!(
                        position = idx + 1,
                        address = %wallet.address(),
                        "Duplicate private key skipped"
                    );
                    continue;
                }
                tracing::info!(address = %wallet.address(), chain_id, "Wallet loaded");
                wallets.push(wallet);
            }
            Err(e) => {
                // Never echo the key itself.
                tracing::warn!(position = idx + 1, error = %e, "Invalid private key skipped");
            }
        }
    }

    wallets
}
