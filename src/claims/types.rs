//! Claim record types shared across subsystems.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::claims::money::Money;

/// Lifecycle state of a claim. Transitions are forward-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClaimStatus {
    /// Created at upload time, awaiting human review.
    PendingReview,
    /// Validated and priced, awaiting disbursement.
    ReadyForPayment,
    /// Disbursement broadcast and transaction hash recorded.
    Settled,
}

impl ClaimStatus {
    fn rank(self) -> u8 {
        match self {
            ClaimStatus::PendingReview => 0,
            ClaimStatus::ReadyForPayment => 1,
            ClaimStatus::Settled => 2,
        }
    }

    /// Whether moving to `next` is a legal forward transition.
    pub fn can_advance_to(self, next: ClaimStatus) -> bool {
        next.rank() > self.rank()
    }
}

/// One billed service line on a claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceLine {
    /// Procedure or service description.
    pub name: String,
    /// Billing code (CPT or similar). Free text, not validated.
    #[serde(default)]
    pub code: String,
    /// Billed amount for this line.
    pub amount: Money,
}

/// A stored claim: one per uploaded document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimRecord {
    pub id: String,
    pub patient_name: String,
    pub provider_name: String,
    /// Disbursement target. Absent means settlement must be refused.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_wallet: Option<String>,
    #[serde(default)]
    pub services: Vec<ServiceLine>,
    pub total_billed_amount: Money,
    pub status: ClaimStatus,
    /// Set exactly once, when settlement is recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    pub created_at: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
}

/// Per-line adjudication outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineValidation {
    pub procedure: String,
    pub billed: Money,
    pub payable: Money,
    pub status: &'static str,
}

/// Result of running the coverage policy over a claim.
///
/// Derived fresh on every computation; never mutates the source record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub total_payable: Money,
    pub validations: Vec<LineValidation>,
    pub status: ClaimStatus,
}

/// Seconds since the Unix epoch.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_transitions_are_forward_only() {
        assert!(ClaimStatus::PendingReview.can_advance_to(ClaimStatus::ReadyForPayment));
        assert!(ClaimStatus::PendingReview.can_advance_to(ClaimStatus::Settled));
        assert!(ClaimStatus::ReadyForPayment.can_advance_to(ClaimStatus::Settled));

        assert!(!ClaimStatus::Settled.can_advance_to(ClaimStatus::PendingReview));
        assert!(!ClaimStatus::Settled.can_advance_to(ClaimStatus::ReadyForPayment));
        assert!(!ClaimStatus::ReadyForPayment.can_advance_to(ClaimStatus::PendingReview));
        assert!(!ClaimStatus::Settled.can_advance_to(ClaimStatus::Settled));
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&ClaimStatus::PendingReview).unwrap(),
            "\"PENDING_REVIEW\""
        );
        assert_eq!(
            serde_json::to_string(&ClaimStatus::ReadyForPayment).unwrap(),
            "\"READY_FOR_PAYMENT\""
        );
        assert_eq!(
            serde_json::to_string(&ClaimStatus::Settled).unwrap(),
            "\"SETTLED\""
        );
    }

    #[test]
    fn test_record_serde_round_trip() {
        let record = ClaimRecord {
            id: "claim-1".into(),
            patient_name: "Jane Doe".into(),
            provider_name: "General Hospital".into(),
            provider_wallet: None,
            services: vec![ServiceLine {
                name: "X-Ray".into(),
                code: "73030".into(),
                amount: Money::from_major(120),
            }],
            total_billed_amount: Money::from_major(120),
            status: ClaimStatus::PendingReview,
            tx_hash: None,
            created_at: 1_700_000_000,
            paid_at: None,
            file_type: Some("application/pdf".into()),
        };

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"totalBilledAmount\":120.0"));
        assert!(!json.contains("txHash"), "unset txHash must be omitted");

        let decoded: ClaimRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.status, ClaimStatus::PendingReview);
        assert_eq!(decoded.services[0].amount, Money::from_major(120));
    }
}
