//! Claim settlement subsystem.
//!
//! # Data Flow
//! ```text
//! ValidationResult (payable amount)
//!     → orchestrator.rs (scale to token units, keccak claim id)
//!     → contract.rs ABI (payProvider on the deployed contract)
//!     → transaction hash, status PENDING
//!     → claim store (recorded immediately, confirmation polled later)
//! ```

pub mod contract;
pub mod orchestrator;
pub mod types;

pub use contract::{LedgerError, SettledEvent, SettlementLedger};
pub use orchestrator::{Orchestrator, TOKEN_DECIMALS};
pub use types::{InFlightSettlements, SettlePermit, SettlementError, SubmittedClaim};
