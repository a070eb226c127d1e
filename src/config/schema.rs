//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML config
//! files, and every field has a default so a minimal config works.
//! Secrets (signing key, AI API key) are never read from the file; they
//! come from environment variables only.

use serde::{Deserialize, Serialize};

use crate::claims::payable::CoveragePolicy;

/// Root configuration for the claim settlement gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, connection limits).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Request hardening settings.
    pub security: SecurityConfig,

    /// Generative-AI document extraction settings.
    pub extraction: ExtractionConfig,

    /// Blockchain settlement settings.
    pub blockchain: BlockchainConfig,

    /// Claim record store settings.
    pub store: StoreConfig,

    /// Reimbursement coverage policy.
    pub policy: CoveragePolicy,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum concurrent connections (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_connections: 10_000,
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Outbound connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Request timeout (total time for request/response) in seconds.
    ///
    /// This bounds the whole upload→extract→settle pipeline, so it is
    /// deliberately generous compared to a plain API timeout.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 60,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Request hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum request body size in bytes (bounds document uploads).
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 10 * 1024 * 1024, // scanned bills run large
        }
    }
}

/// Generative-AI extraction configuration.
///
/// The API key is read from `MEDICLAIM_GEMINI_API_KEY`, never from here.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Enable the extraction client.
    pub enabled: bool,

    /// Base URL of the generateContent-style API.
    pub api_base: String,

    /// Model identifier.
    pub model: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_base: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-2.0-flash".to_string(),
        }
    }
}

/// Blockchain settlement configuration.
///
/// The signing key is read from `MEDICLAIM_SIGNER_KEY`, never from here.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BlockchainConfig {
    /// Enable on-chain settlement.
    pub enabled: bool,

    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs.
    #[serde(default)]
    pub failover_urls: Vec<String>,

    /// Chain ID (e.g., 1 for Ethereum mainnet, 31337 for local Anvil).
    pub chain_id: u64,

    /// Address of the deployed settlement contract.
    pub contract_address: String,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Number of block confirmations that count as final for receipt
    /// lookups. Submission itself never waits for confirmation.
    pub confirmation_blocks: u32,

    /// Gas price multiplier (1.0 = estimated, 1.2 = 20% buffer).
    pub gas_price_multiplier: f64,

    /// Maximum gas price in gwei (protection against spikes).
    pub max_gas_price_gwei: u64,
}

impl Default for BlockchainConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            rpc_url: "http://localhost:8545".to_string(),
            failover_urls: Vec::new(),
            chain_id: 31337,
            contract_address: String::new(),
            rpc_timeout_secs: 10,
            confirmation_blocks: 3,
            gas_price_multiplier: 1.2,
            max_gas_price_gwei: 500,
        }
    }
}

/// Claim record store backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// No store; record endpoints return configuration errors.
    Disabled,
    /// In-process map with optional JSON file persistence.
    #[default]
    Memory,
    /// External document database behind a JSON REST API.
    Remote,
}

/// Claim record store configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,

    /// Base URL of the remote document store (remote backend only).
    pub url: String,

    /// JSON snapshot path (memory backend only).
    pub persistence_path: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_usable() {
        let config = GatewayConfig::default();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert!(!config.blockchain.enabled);
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.policy.coverage_rate_bps, 8_000);
    }

    #[test]
    fn test_minimal_toml_parses() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [listener]
            bind_address = "127.0.0.1:9000"

            [blockchain]
            enabled = true
            contract_address = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"

            [store]
            backend = "remote"
            url = "http://localhost:7000"
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert!(config.blockchain.enabled);
        assert_eq!(config.store.backend, StoreBackend::Remote);
        // Untouched sections fall back to defaults
        assert_eq!(config.timeouts.request_secs, 60);
    }
}
