//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Environment variable (signing key) + config (RPC URL)
//!     → wallet.rs (key loading, nonce tracking)
//!     → client.rs (RPC reads with timeouts and failover)
//!     → transaction.rs (transfer building, receipt inspection)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts
//! - Graceful degradation when the chain is unreachable

pub mod client;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::BlockchainClient;
pub use types::{BlockchainConfig, BlockchainError, ChainId, ConfirmationStatus};
pub use wallet::Wallet;
