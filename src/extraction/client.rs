//! Generative-AI document extraction client.
//!
//! Posts the uploaded document (base64 inline data) together with a
//! structured-output prompt to a `generateContent`-style API and parses
//! the model's JSON reply into `ExtractedFields`. The base URL is
//! configurable so tests can point the client at a mock backend.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Deserialize;
use std::time::Duration;

use crate::config::ExtractionConfig;
use crate::extraction::types::{ExtractedFields, ExtractionError};
use crate::observability::metrics;

/// Environment variable name for the extraction API key.
pub const API_KEY_ENV_VAR: &str = "MEDICLAIM_GEMINI_API_KEY";

const EXTRACTION_PROMPT: &str = "\
You are a medical billing analyst. Extract structured data from this \
medical bill. Return JSON ONLY with: patientName, providerName, \
providerWallet (if found, otherwise null), services [{ name, code, \
amount }], totalBilledAmount, serviceDate. Ensure accuracy of financial \
amounts and codes. Validate JSON before returning.";

/// Client for the document extraction API.
#[derive(Clone)]
pub struct ExtractionClient {
    http: reqwest::Client,
    api_base: String,
    model: String,
    api_key: String,
}

impl ExtractionClient {
    /// Build a client, reading the API key from `MEDICLAIM_GEMINI_API_KEY`.
    pub fn from_env(config: &ExtractionConfig, connect_timeout: Duration) -> Result<Self, String> {
        let api_key = std::env::var(API_KEY_ENV_VAR)
            .map_err(|_| format!("environment variable {} not set", API_KEY_ENV_VAR))?;
        Ok(Self::new(config, api_key, connect_timeout))
    }

    pub fn new(config: &ExtractionConfig, api_key: String, connect_timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .unwrap_or_default();

        Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        }
    }

    /// Extract billing fields from a document.
    ///
    /// One in-flight call, no retries; failures surface to the caller.
    pub async fn extract(
        &self,
        document: &[u8],
        mime_type: &str,
    ) -> Result<ExtractedFields, ExtractionError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.api_base, self.model, self.api_key
        );

        let body = serde_json::json!({
            "contents": [{
                "parts": [
                    { "text": EXTRACTION_PROMPT },
                    { "inline_data": {
                        "mime_type": mime_type,
                        "data": BASE64.encode(document),
                    }},
                ],
            }],
            "generationConfig": { "response_mime_type": "application/json" },
        });

        tracing::debug!(model = %self.model, mime_type, bytes = document.len(), "Requesting extraction");

        let response = self.http.post(&url).json(&body).send().await?;
        if !response.status().is_success() {
            metrics::record_extraction("error");
            return Err(ExtractionError::Status(response.status().as_u16()));
        }

        let payload: GenerateContentResponse = response.json().await?;
        let text = payload
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .filter(|t| !t.is_empty())
            .ok_or(ExtractionError::EmptyResponse)?;

        let fields = parse_fields(&text)?;
        metrics::record_extraction("ok");
        Ok(fields)
    }
}

impl std::fmt::Debug for ExtractionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // api_key deliberately omitted
        f.debug_struct("ExtractionClient")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .finish()
    }
}

/// Parse the model's reply, tolerating prose or markdown fences around
/// the JSON object (everything outside the first `{` and last `}` is
/// discarded).
pub fn parse_fields(text: &str) -> Result<ExtractedFields, ExtractionError> {
    let start = text.find('{').ok_or(ExtractionError::NoStructuredData)?;
    let end = text.rfind('}').ok_or(ExtractionError::NoStructuredData)?;
    if end < start {
        return Err(ExtractionError::NoStructuredData);
    }
    Ok(serde_json::from_str(&text[start..=end])?)
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::money::Money;

    const SAMPLE: &str = r#"{
        "patientName": "Jane Doe",
        "providerName": "General Hospital",
        "providerWallet": null,
        "services": [
            { "name": "X-Ray", "code": "73030", "amount": 120.0 },
            { "name": "Consultation", "code": "99213", "amount": 85.5 }
        ],
        "totalBilledAmount": 205.5
    }"#;

    #[test]
    fn test_parse_plain_json() {
        let fields = parse_fields(SAMPLE).unwrap();
        assert_eq!(fields.patient_name, "Jane Doe");
        assert_eq!(fields.services.len(), 2);
        assert_eq!(fields.total_billed_amount, Money::from_cents(20550));
        assert!(fields.provider_wallet.is_none());
    }

    #[test]
    fn test_parse_json_wrapped_in_markdown() {
        let wrapped = format!("Here is the data:\n```json\n{SAMPLE}\n```\nDone.");
        let fields = parse_fields(&wrapped).unwrap();
        assert_eq!(fields.provider_name, "General Hospital");
    }

    #[test]
    fn test_parse_rejects_output_without_json() {
        assert!(matches!(
            parse_fields("I could not read this document."),
            Err(ExtractionError::NoStructuredData)
        ));
    }

    #[test]
    fn test_empty_wallet_string_treated_as_absent() {
        let mut fields = parse_fields(SAMPLE).unwrap();
        fields.provider_wallet = Some("   ".to_string());
        let record = fields.into_record("claim-1".into(), None);
        assert!(record.provider_wallet.is_none());
    }

    #[test]
    fn test_into_record_starts_pending_review() {
        let record = parse_fields(SAMPLE)
            .unwrap()
            .into_record("claim-1".into(), Some("application/pdf".into()));
        assert_eq!(record.id, "claim-1");
        assert_eq!(record.status, crate::claims::types::ClaimStatus::PendingReview);
        assert!(record.tx_hash.is_none());
        assert!(record.created_at > 0);
    }
}
