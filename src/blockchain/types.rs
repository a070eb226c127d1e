//! Chain-specific types and error definitions.

use serde::Serialize;
use thiserror::Error;

// Re-export BlockchainConfig from the config module to avoid duplication
pub use crate::config::schema::BlockchainConfig;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

/// Errors that can occur during blockchain operations.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// Invalid private key format or derivation error.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Gas price exceeded maximum allowed.
    #[error("Gas price {current_gwei} gwei exceeds maximum {max_gwei} gwei")]
    GasPriceTooHigh { current_gwei: u64, max_gwei: u64 },

    /// Chain configuration mismatch.
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

/// Transaction confirmation status, as reported by receipt lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfirmationStatus {
    /// Transaction is pending in the mempool (no receipt yet).
    Pending,
    /// Mined but not yet at the required confirmation depth.
    #[serde(rename_all = "camelCase")]
    Confirming { current: u32, required: u32 },
    /// Confirmed at the required block depth.
    #[serde(rename_all = "camelCase")]
    Confirmed { block_number: u64 },
    /// Transaction reverted or was dropped.
    Failed { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_id_conversion() {
        let chain_id = ChainId::from(1u64);
        assert_eq!(chain_id.0, 1);
        assert_eq!(u64::from(chain_id), 1);
    }

    #[test]
    fn test_default_config() {
        let config = BlockchainConfig::default();
        assert!(!config.enabled);
        assert_eq!(config.rpc_timeout_secs, 10);
        assert_eq!(config.confirmation_blocks, 3);
    }

    #[test]
    fn test_confirmation_status_wire_format() {
        let json = serde_json::to_value(&ConfirmationStatus::Confirmed { block_number: 42 }).unwrap();
        assert_eq!(json["status"], "CONFIRMED");
        assert_eq!(json["blockNumber"], 42);

        let json = serde_json::to_value(&ConfirmationStatus::Pending).unwrap();
        assert_eq!(json["status"], "PENDING");
    }

    #[test]
    fn test_error_display() {
        let err = BlockchainError::GasPriceTooHigh {
            current_gwei: 600,
            max_gwei: 500,
        };
        assert!(err.to_string().contains("600"));
        assert!(err.to_string().contains("500"));
    }
}
