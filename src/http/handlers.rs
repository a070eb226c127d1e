//! API endpoint handlers.
//!
//! Each handler pulls the subsystems it needs out of `AppState`; a
//! subsystem that was never configured yields an explicit error rather
//! than a silent no-op. Errors cross the boundary via `ApiError`.

use axum::extract::{Multipart, Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::claims::money::Money;
use crate::claims::payable::compute_payable;
use crate::claims::types::{ClaimRecord, ClaimStatus, LineValidation};
use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::observability::metrics;

/// The uploaded billing document: raw bytes plus MIME type.
struct UploadedFile {
    data: Vec<u8>,
    mime_type: String,
}

async fn read_file_field(multipart: &mut Multipart) -> Result<UploadedFile, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("malformed multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let mime_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("failed to read file: {e}")))?
            .to_vec();
        if data.is_empty() {
            return Err(ApiError::MissingInput("file"));
        }
        return Ok(UploadedFile { data, mime_type });
    }
    Err(ApiError::MissingInput("file"))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    claim_id: String,
    #[serde(flatten)]
    record: ClaimRecord,
}

/// `POST /api/upload` — extract fields from a billing document and
/// create the claim record for review.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let extraction = state
        .extraction
        .as_ref()
        .ok_or(ApiError::Unconfigured("extraction"))?;

    let file = read_file_field(&mut multipart).await?;
    let fields = extraction.extract(&file.data, &file.mime_type).await?;

    let claim_id = Uuid::new_v4().to_string();
    let record = fields.into_record(claim_id.clone(), Some(file.mime_type));

    match &state.store {
        Some(store) => {
            store.create(record.clone()).await?;
            metrics::record_claim_stored();
            tracing::info!(claim_id = %claim_id, "Claim created from uploaded document");
        }
        None => {
            tracing::warn!(claim_id = %claim_id, "No claim store configured, record not persisted");
        }
    }

    Ok(Json(UploadResponse { claim_id, record }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessResponse {
    claim_id: String,
    tx_hash: String,
    total_payable: Money,
    validations: Vec<LineValidation>,
    status: ClaimStatus,
}

/// `POST /api/process` — single-shot pipeline: extract, price, and
/// disburse in one request.
///
/// Nothing is persisted on this path; the caller gets the claim id and
/// transaction hash and is expected to record them itself.
pub async fn process(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ProcessResponse>, ApiError> {
    let extraction = state
        .extraction
        .as_ref()
        .ok_or(ApiError::Unconfigured("extraction"))?;
    let settlement = state
        .settlement
        .as_ref()
        .ok_or(ApiError::Unconfigured("blockchain settlement"))?;

    let file = read_file_field(&mut multipart).await?;
    let fields = extraction.extract(&file.data, &file.mime_type).await?;

    let claim_id = Uuid::new_v4().to_string();
    let record = fields.into_record(claim_id.clone(), Some(file.mime_type));
    let validation = compute_payable(&record, &state.policy)?;

    let wallet = record.provider_wallet.as_deref().unwrap_or("");
    let submitted = settlement
        .submit_claim(validation.total_payable, &claim_id, wallet)
        .await?;

    Ok(Json(ProcessResponse {
        claim_id,
        tx_hash: submitted.tx_hash,
        total_payable: validation.total_payable,
        validations: validation.validations,
        status: validation.status,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordTxRequest {
    claim_id: Option<String>,
    tx_hash: Option<String>,
    status: Option<ClaimStatus>,
}

/// `POST /api/record-tx` — bind an externally observed transaction
/// hash to a claim. Settles the record at most once.
pub async fn record_tx(
    State(state): State<AppState>,
    Json(body): Json<RecordTxRequest>,
) -> Result<Json<ClaimRecord>, ApiError> {
    let store = state.store.as_ref().ok_or(ApiError::Unconfigured("store"))?;

    let claim_id = body.claim_id.ok_or(ApiError::MissingInput("claimId"))?;
    let tx_hash = body.tx_hash.ok_or(ApiError::MissingInput("txHash"))?;
    let status = body.status.unwrap_or(ClaimStatus::Settled);

    let record = store.try_settle(&claim_id, &tx_hash, status).await?;
    tracing::info!(claim_id = %claim_id, tx_hash = %tx_hash, "Settlement recorded");
    Ok(Json(record))
}

/// `GET /api/claims/{id}`
pub async fn get_claim(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ClaimRecord>, ApiError> {
    let store = state.store.as_ref().ok_or(ApiError::Unconfigured("store"))?;
    Ok(Json(store.get(&id).await?))
}

/// `POST /api/claims/{id}/validate` — recompute the payable from the
/// stored record. Read-only; the record is never mutated.
pub async fn validate_claim(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<crate::claims::types::ValidationResult>, ApiError> {
    let store = state.store.as_ref().ok_or(ApiError::Unconfigured("store"))?;
    let record = store.get(&id).await?;
    Ok(Json(compute_payable(&record, &state.policy)?))
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettleMode {
    /// Disburse through the settlement contract.
    #[default]
    Contract,
    /// Plain value transfer straight to the provider wallet.
    Direct,
}

#[derive(Default, Deserialize)]
pub struct SettleRequest {
    #[serde(default)]
    mode: SettleMode,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettleResponse {
    claim_id: String,
    tx_hash: String,
    status: ClaimStatus,
    total_payable: Money,
}

/// `POST /api/claims/{id}/settle` — reviewed-claim flow: price the
/// stored record, disburse, and record the hash immediately.
pub async fn settle_claim(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Option<Json<SettleRequest>>,
) -> Result<Json<SettleResponse>, ApiError> {
    let store = state.store.as_ref().ok_or(ApiError::Unconfigured("store"))?;
    let settlement = state
        .settlement
        .as_ref()
        .ok_or(ApiError::Unconfigured("blockchain settlement"))?;
    let mode = body.map(|Json(b)| b.mode).unwrap_or_default();

    // Reserve the claim before any broadcast: without this, two
    // concurrent settles both pass the stored-record check and each
    // disburse. The permit drops on every exit path, so a failed
    // submission frees the claim for a retry.
    let _permit = state
        .settling
        .acquire(&id)
        .ok_or_else(|| ApiError::SettlementInFlight(id.clone()))?;

    let record = store.get(&id).await?;
    if record.status == ClaimStatus::Settled || record.tx_hash.is_some() {
        return Err(ApiError::AlreadySettled(id));
    }

    let validation = compute_payable(&record, &state.policy)?;
    let wallet = record.provider_wallet.as_deref().unwrap_or("");

    let submitted = match mode {
        SettleMode::Contract => {
            settlement
                .submit_claim(validation.total_payable, &id, wallet)
                .await?
        }
        SettleMode::Direct => {
            settlement
                .direct_transfer(wallet, validation.total_payable)
                .await?
        }
    };

    // Hash recorded as soon as the broadcast is accepted; confirmation
    // is a separate lookup. A concurrent settle loses here with a 409.
    let settled = store
        .try_settle(&id, &submitted.tx_hash, ClaimStatus::Settled)
        .await?;

    Ok(Json(SettleResponse {
        claim_id: id,
        tx_hash: submitted.tx_hash,
        status: settled.status,
        total_payable: validation.total_payable,
    }))
}

/// `GET /api/tx/{hash}` — one-shot confirmation lookup.
pub async fn tx_status(
    State(state): State<AppState>,
    Path(hash): Path<String>,
) -> Result<Json<crate::blockchain::types::ConfirmationStatus>, ApiError> {
    let settlement = state
        .settlement
        .as_ref()
        .ok_or(ApiError::Unconfigured("blockchain settlement"))?;
    let tx_hash = hash
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid transaction hash: {hash}")))?;
    Ok(Json(settlement.confirmation_status(tx_hash).await?))
}

/// `GET /health` — liveness plus per-dependency status.
pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let chain_healthy = match &state.settlement {
        Some(s) => Some(s.is_healthy().await),
        None => None,
    };

    Json(json!({
        "status": "ok",
        "dependencies": {
            "store": { "configured": state.store.is_some() },
            "extraction": { "configured": state.extraction.is_some() },
            "blockchain": {
                "configured": state.settlement.is_some(),
                "healthy": chain_healthy,
            },
        },
    }))
}
