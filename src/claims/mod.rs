//! Claim domain model and payable computation.
//!
//! # Data Flow
//! ```text
//! Extracted billing fields (AI service)
//!     → types.rs (ClaimRecord, ServiceLine, ClaimStatus)
//!     → payable.rs (coverage policy → ValidationResult)
//!     → settlement / store subsystems
//! ```
//!
//! # Design Decisions
//! - All monetary values are fixed-point minor units (cents); floating
//!   point never touches stored or transmitted amounts
//! - `compute_payable` is a pure function of the record and policy
//! - Status transitions are forward-only (no cancel/reverse path)

pub mod money;
pub mod payable;
pub mod types;

pub use money::Money;
pub use payable::{compute_payable, ClaimValidationError, CoveragePolicy};
pub use types::{ClaimRecord, ClaimStatus, ServiceLine, ValidationResult};
