//! HTTP-backed claim store.
//!
//! Talks to an external document store over a small JSON REST surface:
//! `PUT /claims/{id}` writes a record, `GET /claims/{id}` reads one.
//! Anything speaking that shape (a Firestore proxy, a CouchDB bucket,
//! a test double) can back the gateway.

use std::time::Duration;

use crate::claims::types::{unix_now, ClaimRecord, ClaimStatus};
use crate::store::types::StoreError;

#[derive(Clone)]
pub struct RemoteStore {
    http: reqwest::Client,
    base_url: String,
}

impl RemoteStore {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn claim_url(&self, id: &str) -> String {
        format!("{}/claims/{}", self.base_url, id)
    }

    pub async fn create(&self, record: ClaimRecord) -> Result<String, StoreError> {
        let id = record.id.clone();
        self.put(&id, &record).await?;
        Ok(id)
    }

    pub async fn get(&self, id: &str) -> Result<ClaimRecord, StoreError> {
        let response = self.http.get(self.claim_url(id)).send().await?;
        match response.status().as_u16() {
            404 => Err(StoreError::NotFound(id.to_string())),
            s if !(200..300).contains(&s) => Err(StoreError::Status(s)),
            _ => Ok(response.json().await?),
        }
    }

    pub async fn update(&self, id: &str, record: ClaimRecord) -> Result<(), StoreError> {
        // Existence check first so an update of an unknown id surfaces
        // as NotFound instead of silently creating the document.
        self.get(id).await?;
        self.put(id, &record).await
    }

    /// Read-check-write settle guard.
    ///
    /// Not atomic against a concurrent writer on the remote side; the
    /// gateway is the only writer in this deployment, so the check
    /// still holds in practice.
    pub async fn try_settle(
        &self,
        id: &str,
        tx_hash: &str,
        status: ClaimStatus,
    ) -> Result<ClaimRecord, StoreError> {
        let mut record = self.get(id).await?;
        if record.status == ClaimStatus::Settled || record.tx_hash.is_some() {
            return Err(StoreError::AlreadySettled(id.to_string()));
        }
        if !record.status.can_advance_to(status) {
            return Err(StoreError::InvalidTransition {
                id: id.to_string(),
                from: record.status,
                to: status,
            });
        }
        record.tx_hash = Some(tx_hash.to_string());
        record.status = status;
        record.paid_at = Some(unix_now());
        self.put(id, &record).await?;
        Ok(record)
    }

    async fn put(&self, id: &str, record: &ClaimRecord) -> Result<(), StoreError> {
        let response = self
            .http
            .put(self.claim_url(id))
            .json(record)
            .send()
            .await?;
        let code = response.status().as_u16();
        if !(200..300).contains(&code) {
            return Err(StoreError::Status(code));
        }
        Ok(())
    }
}

impl std::fmt::Debug for RemoteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteStore")
            .field("base_url", &self.base_url)
            .finish()
    }
}
