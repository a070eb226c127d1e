//! Blockchain RPC client with timeout and failover handling.
//!
//! # Responsibilities
//! - Connect to JSON-RPC endpoint(s)
//! - Query chain state (block number, balances, nonces, receipts)
//! - Fall through to failover providers on error or timeout
//! - Provide a health probe for chain connectivity

use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionReceipt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::blockchain::types::{BlockchainConfig, BlockchainError, BlockchainResult, ChainId};
use crate::observability::metrics;

/// Try each provider in order, logging and moving on when one fails.
macro_rules! try_providers {
    ($self:ident, $what:literal, |$provider:ident| $call:expr) => {
        'attempt: {
            for (i, $provider) in $self.providers.iter().enumerate() {
                match timeout($self.timeout_duration, $call).await {
                    Ok(Ok(value)) => break 'attempt Ok(value),
                    Ok(Err(e)) => {
                        tracing::warn!(provider_idx = i, error = %e, concat!("RPC error: ", $what))
                    }
                    Err(_) => tracing::warn!(provider_idx = i, concat!("RPC timeout: ", $what)),
                }
            }
            Err(BlockchainError::Rpc(
                concat!("all RPC providers failed: ", $what).to_string(),
            ))
        }
    };
}

/// Read-side RPC client wrapper with failover support.
#[derive(Clone)]
pub struct BlockchainClient {
    /// Primary provider followed by failovers.
    providers: Vec<Arc<dyn Provider + Send + Sync>>,
    config: BlockchainConfig,
    timeout_duration: Duration,
}

impl BlockchainClient {
    /// Create a new blockchain client from configuration.
    ///
    /// Initialization succeeds even when the chain is unreachable; the
    /// chain-id check only logs so the gateway can degrade gracefully.
    pub async fn new(config: BlockchainConfig) -> BlockchainResult<Self> {
        let timeout_duration = Duration::from_secs(config.rpc_timeout_secs);
        let mut providers: Vec<Arc<dyn Provider + Send + Sync>> = Vec::new();

        let primary: url::Url = config.rpc_url.parse().map_err(|e| {
            BlockchainError::Rpc(format!("invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;
        providers.push(Arc::new(ProviderBuilder::new().connect_http(primary)));

        for url_str in &config.failover_urls {
            match url_str.parse::<url::Url>() {
                Ok(url) => providers.push(Arc::new(ProviderBuilder::new().connect_http(url))),
                Err(_) => tracing::warn!(url = %url_str, "Ignoring invalid failover RPC URL"),
            }
        }

        let client = Self {
            providers,
            config: config.clone(),
            timeout_duration,
        };

        match client.verify_chain_id().await {
            Ok(()) => tracing::info!(
                rpc_url = %config.rpc_url,
                chain_id = config.chain_id,
                "Blockchain client initialized"
            ),
            Err(e) => tracing::warn!(
                error = %e,
                "Blockchain client initialized but chain verification failed"
            ),
        }

        Ok(client)
    }

    /// Verify the connected chain ID matches configuration.
    pub async fn verify_chain_id(&self) -> BlockchainResult<()> {
        let chain_id = self.get_chain_id().await?;
        if chain_id.0 != self.config.chain_id {
            return Err(BlockchainError::ChainMismatch {
                expected: self.config.chain_id,
                actual: chain_id.0,
            });
        }
        Ok(())
    }

    pub async fn get_chain_id(&self) -> BlockchainResult<ChainId> {
        let id = try_providers!(self, "get chain id", |provider| provider.get_chain_id())?;
        Ok(ChainId(id))
    }

    pub async fn get_block_number(&self) -> BlockchainResult<u64> {
        try_providers!(self, "get block number", |provider| provider
            .get_block_number())
    }

    /// Get the native-currency balance of an address.
    pub async fn get_balance(&self, address: Address) -> BlockchainResult<U256> {
        try_providers!(self, "get balance", |provider| provider
            .get_balance(address))
    }

    /// Get the transaction count (nonce) for an address.
    pub async fn get_transaction_count(&self, address: Address) -> BlockchainResult<u64> {
        try_providers!(self, "get transaction count", |provider| provider
            .get_transaction_count(address))
    }

    /// Get a transaction receipt by hash. `None` means still pending.
    pub async fn get_transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> BlockchainResult<Option<TransactionReceipt>> {
        try_providers!(self, "get receipt", |provider| provider
            .get_transaction_receipt(tx_hash))
    }

    /// Get the current gas price in wei.
    pub async fn get_gas_price(&self) -> BlockchainResult<u128> {
        try_providers!(self, "get gas price", |provider| provider.get_gas_price())
    }

    /// Check whether the chain is reachable, feeding the health gauge.
    pub async fn is_healthy(&self) -> bool {
        let healthy = self.get_block_number().await.is_ok();
        metrics::record_dependency_health("blockchain_rpc", healthy);
        healthy
    }

    /// Get the underlying primary provider.
    pub fn provider(&self) -> &(dyn Provider + Send + Sync) {
        self.providers[0].as_ref()
    }

    pub fn config(&self) -> &BlockchainConfig {
        &self.config
    }

    /// Number of confirmation blocks counted as final.
    pub fn confirmation_blocks(&self) -> u32 {
        self.config.confirmation_blocks
    }
}

impl std::fmt::Debug for BlockchainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockchainClient")
            .field("rpc_url", &self.config.rpc_url)
            .field("chain_id", &self.config.chain_id)
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> BlockchainConfig {
        BlockchainConfig {
            enabled: true,
            rpc_url: "http://localhost:8545".to_string(),
            chain_id: 31337, // Anvil default
            rpc_timeout_secs: 2,
            ..BlockchainConfig::default()
        }
    }

    #[tokio::test]
    async fn test_client_creation_without_chain() {
        // Creation must not fail just because the RPC is unreachable
        let result = BlockchainClient::new(test_config()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_invalid_rpc_url_is_rejected() {
        let mut config = test_config();
        config.rpc_url = "not a url".to_string();
        let result = BlockchainClient::new(config).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_failover_exhaustion_reports_all_failed() {
        let mut config = test_config();
        config.failover_urls.push("http://invalid:8545".to_string());

        let client = BlockchainClient::new(config).await.unwrap();
        let result = client.get_chain_id().await;
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("all RPC providers failed"));
    }
}
