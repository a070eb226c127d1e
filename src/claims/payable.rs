//! Payable computation under the fixed coverage policy.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::claims::money::Money;
use crate::claims::types::{ClaimRecord, ClaimStatus, LineValidation, ValidationResult};

/// Basic sanity failures that make a claim unpriceable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ClaimValidationError {
    #[error("claim is missing a patient name")]
    MissingPatientName,
    #[error("claim is missing a provider name")]
    MissingProviderName,
    #[error("total billed amount must be greater than zero")]
    ZeroBilledAmount,
}

/// Fixed reimbursement policy: a flat coverage rate with a per-line cap.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct CoveragePolicy {
    /// Coverage rate in basis points (8_000 = 80%).
    pub coverage_rate_bps: u32,
    /// Maximum payable per service line.
    pub per_line_cap: Money,
}

impl Default for CoveragePolicy {
    fn default() -> Self {
        Self {
            coverage_rate_bps: 8_000,
            per_line_cap: Money::from_major(500),
        }
    }
}

/// Compute the payable amount for a claim under `policy`.
///
/// Pure and deterministic: no I/O, same input always yields the same
/// output. Per line the payable is `min(amount * rate, per_line_cap)`;
/// the total is then clamped to the billed total, never above it.
///
/// Every line is currently marked `"Validated"` — this is the seam where
/// real adjudication rules would plug in.
pub fn compute_payable(
    record: &ClaimRecord,
    policy: &CoveragePolicy,
) -> Result<ValidationResult, ClaimValidationError> {
    if record.patient_name.trim().is_empty() {
        return Err(ClaimValidationError::MissingPatientName);
    }
    if record.provider_name.trim().is_empty() {
        return Err(ClaimValidationError::MissingProviderName);
    }
    if record.total_billed_amount.is_zero() {
        return Err(ClaimValidationError::ZeroBilledAmount);
    }

    let mut total = Money::ZERO;
    let mut validations = Vec::with_capacity(record.services.len());

    for line in &record.services {
        let payable = line
            .amount
            .apply_rate_bps(policy.coverage_rate_bps)
            .min(policy.per_line_cap);
        total = total.saturating_add(payable);

        validations.push(LineValidation {
            procedure: line.name.clone(),
            billed: line.amount,
            payable,
            status: "Validated",
        });
    }

    Ok(ValidationResult {
        total_payable: total.min(record.total_billed_amount),
        validations,
        status: ClaimStatus::ReadyForPayment,
    })
}
