//! Claim record persistence.
//!
//! Two backends behind one dispatch type: an in-process `DashMap` with
//! optional JSON snapshots, and an HTTP document store. The backend is
//! picked from config; `Disabled` yields no store at all, and handlers
//! that need one refuse their requests explicitly.

pub mod memory;
pub mod remote;
pub mod types;

use std::time::Duration;

use crate::claims::types::{ClaimRecord, ClaimStatus};
use crate::config::schema::{StoreBackend, StoreConfig};

pub use memory::MemoryStore;
pub use remote::RemoteStore;
pub use types::StoreError;

/// Backend dispatch for claim persistence.
#[derive(Debug, Clone)]
pub enum ClaimStore {
    Memory(MemoryStore),
    Remote(RemoteStore),
}

impl ClaimStore {
    /// Build the configured backend, or `None` when storage is disabled.
    pub fn from_config(config: &StoreConfig, timeout: Duration) -> Result<Option<Self>, StoreError> {
        match config.backend {
            StoreBackend::Disabled => Ok(None),
            StoreBackend::Memory => Ok(Some(Self::Memory(MemoryStore::new(
                config.persistence_path.clone(),
            )))),
            StoreBackend::Remote => {
                let store = RemoteStore::new(&config.url, timeout)?;
                Ok(Some(Self::Remote(store)))
            }
        }
    }

    pub async fn create(&self, record: ClaimRecord) -> Result<String, StoreError> {
        match self {
            Self::Memory(s) => s.create(record),
            Self::Remote(s) => s.create(record).await,
        }
    }

    pub async fn get(&self, id: &str) -> Result<ClaimRecord, StoreError> {
        match self {
            Self::Memory(s) => s.get(id),
            Self::Remote(s) => s.get(id).await,
        }
    }

    pub async fn update(&self, id: &str, record: ClaimRecord) -> Result<(), StoreError> {
        match self {
            Self::Memory(s) => s.update(id, record),
            Self::Remote(s) => s.update(id, record).await,
        }
    }

    /// Record a settlement hash exactly once; later attempts get
    /// `AlreadySettled`.
    pub async fn try_settle(
        &self,
        id: &str,
        tx_hash: &str,
        status: ClaimStatus,
    ) -> Result<ClaimRecord, StoreError> {
        match self {
            Self::Memory(s) => s.try_settle(id, tx_hash, status),
            Self::Remote(s) => s.try_settle(id, tx_hash, status).await,
        }
    }
}
