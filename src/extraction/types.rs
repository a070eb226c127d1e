//! Extraction result types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::claims::money::Money;
use crate::claims::types::{unix_now, ClaimRecord, ClaimStatus, ServiceLine};

/// Structured billing fields returned by the extraction model.
///
/// Free-text fields are model (and therefore attacker) controlled; only
/// presence is validated here. Amounts go through `Money`, which rejects
/// negatives and sub-cent string precision.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedFields {
    pub patient_name: String,
    pub provider_name: String,
    #[serde(default)]
    pub provider_wallet: Option<String>,
    #[serde(default)]
    pub services: Vec<ServiceLine>,
    pub total_billed_amount: Money,
    #[serde(default)]
    pub service_date: Option<String>,
}

impl ExtractedFields {
    /// Materialize a fresh claim record from the extracted fields.
    pub fn into_record(self, id: String, file_type: Option<String>) -> ClaimRecord {
        ClaimRecord {
            id,
            patient_name: self.patient_name,
            provider_name: self.provider_name,
            // Treat a model-emitted empty string the same as absent
            provider_wallet: self.provider_wallet.filter(|w| !w.trim().is_empty()),
            services: self.services,
            total_billed_amount: self.total_billed_amount,
            status: ClaimStatus::PendingReview,
            tx_hash: None,
            created_at: unix_now(),
            paid_at: None,
            file_type,
        }
    }
}

/// Errors from the extraction service or its output.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("extraction request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("extraction service returned HTTP {0}")]
    Status(u16),

    #[error("extraction service returned an empty response")]
    EmptyResponse,

    #[error("no structured data in model output")]
    NoStructuredData,

    #[error("failed to parse extracted fields: {0}")]
    Parse(#[from] serde_json::Error),
}
