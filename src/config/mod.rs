//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → shared by value / via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Secrets come from environment variables, never the config file
//! - Validation separates syntactic (serde) from semantic checks and
//!   reports every problem at once

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::{
    BlockchainConfig, ExtractionConfig, GatewayConfig, ListenerConfig, ObservabilityConfig,
    SecurityConfig, StoreBackend, StoreConfig, TimeoutConfig,
};
