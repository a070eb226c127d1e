//! Settlement types and error definitions.

use dashmap::DashSet;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

use crate::blockchain::types::BlockchainError;

/// Errors from the disbursement flow.
#[derive(Debug, Error)]
pub enum SettlementError {
    /// A required deployment setting is absent. Fatal and non-retryable;
    /// checked before any network call.
    #[error("settlement configuration missing: {0}")]
    Configuration(String),

    /// The claim carries no provider wallet. Disbursement is refused
    /// rather than falling back to the zero address.
    #[error("claim has no provider wallet; refusing to disburse")]
    MissingRecipient,

    #[error("invalid provider wallet address: {0}")]
    InvalidRecipient(String),

    #[error(transparent)]
    Chain(#[from] BlockchainError),

    /// The chain rejected the submission (insufficient funds, nonce
    /// conflict, revert). Surfaced unchanged; no retry is performed.
    #[error("transaction submission failed: {0}")]
    Submission(String),
}

/// A disbursement accepted into the mempool.
///
/// The status is always `PENDING`: submission returns as soon as the
/// transaction is accepted, and confirmation is the caller's concern
/// via receipt lookup.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedClaim {
    pub tx_hash: String,
    pub status: &'static str,
}

impl SubmittedClaim {
    pub fn pending(tx_hash: String) -> Self {
        Self {
            tx_hash,
            status: "PENDING",
        }
    }
}

/// Registry of claims with a disbursement currently in flight.
///
/// A broadcast must be reserved here before it is submitted: two
/// concurrent settles on the same claim would otherwise both pass the
/// stored-record check and each put a transaction in the mempool. The
/// permit is held across the broadcast and releases on drop, so a
/// failed submission frees the claim for a retry.
#[derive(Clone, Default)]
pub struct InFlightSettlements {
    inner: Arc<DashSet<String>>,
}

impl InFlightSettlements {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve `claim_id` for settlement. `None` means another request
    /// already holds the claim.
    pub fn acquire(&self, claim_id: &str) -> Option<SettlePermit> {
        if self.inner.insert(claim_id.to_string()) {
            Some(SettlePermit {
                registry: self.inner.clone(),
                claim_id: claim_id.to_string(),
            })
        } else {
            None
        }
    }
}

/// Exclusive hold on a claim's settlement; released on drop.
pub struct SettlePermit {
    registry: Arc<DashSet<String>>,
    claim_id: String,
}

impl Drop for SettlePermit {
    fn drop(&mut self) {
        self.registry.remove(&self.claim_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_permit_per_claim() {
        let inflight = InFlightSettlements::new();

        let permit = inflight.acquire("claim-1");
        assert!(permit.is_some());
        // A concurrent settle on the same claim is locked out
        assert!(inflight.acquire("claim-1").is_none());
        // Other claims are unaffected
        assert!(inflight.acquire("claim-2").is_some());
    }

    #[test]
    fn test_concurrent_settlers_win_one_permit() {
        let inflight = InFlightSettlements::new();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let inflight = inflight.clone();
            handles.push(std::thread::spawn(move || inflight.acquire("claim-1")));
        }

        // Permits stay alive until the vec drops, so losers cannot
        // sneak in after a winner finishes.
        let permits: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let wins = permits.iter().filter(|p| p.is_some()).count();
        assert_eq!(wins, 1, "exactly one settle attempt may broadcast");
    }

    #[test]
    fn test_dropping_the_permit_releases_the_claim() {
        let inflight = InFlightSettlements::new();

        let permit = inflight.acquire("claim-1").unwrap();
        drop(permit);

        // A failed broadcast must not wedge the claim
        assert!(inflight.acquire("claim-1").is_some());
    }
}
