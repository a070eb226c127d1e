//! HTTP boundary error mapping.
//!
//! Every subsystem error funnels through `ApiError`, which renders a
//! JSON `{"error": ...}` body with the status the failure deserves.
//! Missing caller input is 400, unknown records 404, double settles
//! 409; everything else is the gateway's fault and reports 500.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::blockchain::types::BlockchainError;
use crate::claims::payable::ClaimValidationError;
use crate::extraction::types::ExtractionError;
use crate::settlement::types::SettlementError;
use crate::store::StoreError;

#[derive(Debug)]
pub enum ApiError {
    /// A required request field is absent.
    MissingInput(&'static str),

    /// The request addressed a subsystem this deployment never
    /// configured. Reported explicitly instead of pretending success.
    Unconfigured(&'static str),

    BadRequest(String),
    NotFound(String),
    AlreadySettled(String),

    /// Another request holds this claim's settlement permit.
    SettlementInFlight(String),
    Extraction(ExtractionError),
    Validation(ClaimValidationError),
    Settlement(SettlementError),
    Chain(BlockchainError),
    Store(StoreError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::MissingInput(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::AlreadySettled(_) | Self::SettlementInFlight(_) => StatusCode::CONFLICT,
            // Absent or unusable payout targets are caller-fixable
            Self::Settlement(SettlementError::MissingRecipient)
            | Self::Settlement(SettlementError::InvalidRecipient(_)) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::MissingInput(field) => format!("missing required field: {field}"),
            Self::Unconfigured(subsystem) => {
                format!("{subsystem} is not configured on this deployment")
            }
            Self::BadRequest(msg) => msg.clone(),
            Self::NotFound(id) => format!("claim {id} not found"),
            Self::AlreadySettled(id) => format!("claim {id} is already settled"),
            Self::SettlementInFlight(id) => {
                format!("settlement already in progress for claim {id}")
            }
            Self::Extraction(e) => format!("extraction failed: {e}"),
            Self::Validation(e) => format!("claim validation failed: {e}"),
            Self::Settlement(e) => format!("settlement failed: {e}"),
            Self::Chain(e) => format!("chain error: {e}"),
            Self::Store(e) => format!("store error: {e}"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = %status, error = ?self, "Request failed");
        } else {
            tracing::debug!(status = %status, error = ?self, "Request rejected");
        }
        (status, Json(json!({ "error": self.message() }))).into_response()
    }
}

impl From<ExtractionError> for ApiError {
    fn from(e: ExtractionError) -> Self {
        Self::Extraction(e)
    }
}

impl From<ClaimValidationError> for ApiError {
    fn from(e: ClaimValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<SettlementError> for ApiError {
    fn from(e: SettlementError) -> Self {
        Self::Settlement(e)
    }
}

impl From<BlockchainError> for ApiError {
    fn from(e: BlockchainError) -> Self {
        Self::Chain(e)
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => Self::NotFound(id),
            StoreError::AlreadySettled(id) => Self::AlreadySettled(id),
            e @ StoreError::InvalidTransition { .. } => Self::BadRequest(e.to_string()),
            other => Self::Store(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::MissingInput("file").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::AlreadySettled("x".into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::SettlementInFlight("x".into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::Unconfigured("store").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(SettlementError::MissingRecipient).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_store_error_routing() {
        let e = ApiError::from(StoreError::NotFound("c1".into()));
        assert!(matches!(e, ApiError::NotFound(_)));
        let e = ApiError::from(StoreError::AlreadySettled("c1".into()));
        assert!(matches!(e, ApiError::AlreadySettled(_)));
        let e = ApiError::from(StoreError::Status(502));
        assert!(matches!(e, ApiError::Store(_)));

        // A backward status on record-tx is the caller's mistake
        let e = ApiError::from(StoreError::InvalidTransition {
            id: "c1".into(),
            from: crate::claims::types::ClaimStatus::ReadyForPayment,
            to: crate::claims::types::ClaimStatus::PendingReview,
        });
        assert_eq!(e.status(), StatusCode::BAD_REQUEST);
    }
}
