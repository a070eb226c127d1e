//! Medical claim settlement gateway.
//!
//! Receives billing documents, extracts the claim fields with a
//! generative-AI model, prices them under a fixed coverage policy, and
//! disburses the payable on-chain through a small settlement contract,
//! recording the transaction hash on the claim record.

pub mod blockchain;
pub mod claims;
pub mod config;
pub mod extraction;
pub mod http;
pub mod observability;
pub mod settlement;
pub mod store;

pub use config::GatewayConfig;
pub use http::HttpServer;
