//! In-process claim store with optional JSON snapshot persistence.

use dashmap::DashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::Arc;

use crate::claims::types::{unix_now, ClaimRecord, ClaimStatus};
use crate::store::types::StoreError;

/// Thread-safe in-memory claim map.
///
/// With a persistence path configured, the map is reloaded at startup
/// and snapshotted after every mutation. This is demo-grade durability:
/// a full rewrite per write, no fsync guarantees.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<DashMap<String, ClaimRecord>>,
    persistence_path: Option<String>,
}

impl MemoryStore {
    pub fn new(persistence_path: Option<String>) -> Self {
        let store = Self {
            inner: Arc::new(DashMap::new()),
            persistence_path,
        };
        if let Err(e) = store.load_from_file() {
            tracing::warn!(error = %e, "Could not load claim snapshot, starting empty");
        }
        store
    }

    /// Insert a new claim record, returning its id.
    pub fn create(&self, record: ClaimRecord) -> Result<String, StoreError> {
        let id = record.id.clone();
        self.inner.insert(id.clone(), record);
        self.save_to_file()?;
        Ok(id)
    }

    pub fn get(&self, id: &str) -> Result<ClaimRecord, StoreError> {
        self.inner
            .get(id)
            .map(|r| r.value().clone())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Replace a stored record wholesale. Last write wins; reviewers
    /// editing the same claim concurrently are not guarded against.
    pub fn update(&self, id: &str, record: ClaimRecord) -> Result<(), StoreError> {
        if !self.inner.contains_key(id) {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.inner.insert(id.to_string(), record);
        self.save_to_file()
    }

    /// Record a settlement exactly once.
    ///
    /// Compare-and-set on the status: the first caller wins, any later
    /// attempt gets `AlreadySettled`. The shard lock held by `get_mut`
    /// makes the check-and-write atomic against concurrent settlers.
    pub fn try_settle(
        &self,
        id: &str,
        tx_hash: &str,
        status: ClaimStatus,
    ) -> Result<ClaimRecord, StoreError> {
        let updated = {
            let mut entry = self
                .inner
                .get_mut(id)
                .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

            if entry.status == ClaimStatus::Settled || entry.tx_hash.is_some() {
                return Err(StoreError::AlreadySettled(id.to_string()));
            }
            if !entry.status.can_advance_to(status) {
                return Err(StoreError::InvalidTransition {
                    id: id.to_string(),
                    from: entry.status,
                    to: status,
                });
            }

            entry.tx_hash = Some(tx_hash.to_string());
            entry.status = status;
            entry.paid_at = Some(unix_now());
            entry.clone()
        };
        self.save_to_file()?;
        Ok(updated)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    fn load_from_file(&self) -> Result<(), StoreError> {
        let Some(path) = &self.persistence_path else {
            return Ok(());
        };
        if !Path::new(path).exists() {
            return Ok(());
        }
        let file = File::open(path)?;
        let records: Vec<ClaimRecord> = serde_json::from_reader(BufReader::new(file))?;
        for record in records {
            self.inner.insert(record.id.clone(), record);
        }
        tracing::info!(path = %path, count = self.inner.len(), "Loaded claim snapshot");
        Ok(())
    }

    fn save_to_file(&self) -> Result<(), StoreError> {
        let Some(path) = &self.persistence_path else {
            return Ok(());
        };
        let records: Vec<ClaimRecord> = self.inner.iter().map(|r| r.value().clone()).collect();
        let file = File::create(path)?;
        serde_json::to_writer(BufWriter::new(file), &records)?;
        Ok(())
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("len", &self.len())
            .finish()
    }
}
