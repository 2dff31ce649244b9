//! Chain-specific types and error definitions.

use alloy::primitives::TxHash;
use thiserror::Error;

// Re-export BlockchainConfig from config module to avoid duplication
pub use crate::config::schema::BlockchainConfig;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

impl std::fmt::Display for ChainId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors that can occur during blockchain operations.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// Invalid private key format or derivation error.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Building or signing the transaction envelope failed.
    #[error("Signing error: {0}")]
    Signing(String),

    /// Contract call returned data that could not be decoded.
    #[error("Contract error: {0}")]
    Contract(String),

    /// A human-readable amount could not be converted to wei.
    #[error("Unit conversion error: {0}")]
    Units(String),

    /// Chain configuration mismatch.
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

/// The parts of a transaction receipt the check-in flow cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiptSummary {
    /// Hash of the mined transaction.
    pub tx_hash: TxHash,
    /// `true` when the transaction executed without reverting.
    pub success: bool,
    /// Gas actually consumed.
    pub gas_used: u64,
    /// Block the transaction was included in, when reported.
    pub block_number: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_id_conversion() {
        let chain_id = ChainId(1868);
        assert_eq!(chain_id.0, 1868);
        assert_eq!(u64::from(chain_id), 1868);
        assert_eq!(chain_id.to_string(), "1868");
    }

    #[test]
    fn test_default_config() {
        let config = BlockchainConfig::default();
        assert_eq!(config.rpc_url, "https://rpc.soneium.org");
        assert_eq!(config.rpc_timeout_secs, 10);
        assert!(config.chain_id.is_none());
    }

    #[test]
    fn test_error_display() {
        let err = BlockchainError::Timeout(10);
        assert_eq!(err.to_string(), "RPC timeout after 10 seconds");

        let err = BlockchainError::ChainMismatch {
            expected: 1868,
            actual: 1,
        };
        assert!(err.to_string().contains("1868"));
    }
}
