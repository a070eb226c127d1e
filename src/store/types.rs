//! Claim store error definitions.

use thiserror::Error;

use crate::claims::types::ClaimStatus;

/// Errors from claim record persistence.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("claim {0} not found")]
    NotFound(String),

    /// The settle transition already happened for this claim. The
    /// compare-and-set guard reports this instead of double-recording.
    #[error("claim {0} is already settled")]
    AlreadySettled(String),

    /// The requested status does not move the claim forward.
    #[error("claim {id} cannot move from {from:?} to {to:?}")]
    InvalidTransition {
        id: String,
        from: ClaimStatus,
        to: ClaimStatus,
    },

    #[error("document store request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("document store returned HTTP {0}")]
    Status(u16),

    #[error("failed to decode stored claim: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("snapshot persistence failed: {0}")]
    Io(#[from] std::io::Error),
}
