//! Async adapters implementing the quad-types contracts over SQLite.
//!
//! rusqlite is blocking, so every call hops to `spawn_blocking` with a cloned
//! handle rather than stalling the async runtime.

use std::sync::Arc;

use async_trait::async_trait;

use quad_types::contracts::{IdentityDirectory, NewUnlockRecord, ResourceStore, UnlockLedger};
use quad_types::error::{LedgerError, StoreError};
use quad_types::resource::ResourceKind;

use crate::Database;

#[derive(Clone)]
pub struct SqliteBackend {
    db: Arc<Database>,
}

impl SqliteBackend {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

fn join_err(e: tokio::task::JoinError) -> anyhow::Error {
    anyhow::anyhow!("spawn_blocking join error: {}", e)
}

#[async_trait]
impl UnlockLedger for SqliteBackend {
    async fn exists(
        &self,
        payer_id: &str,
        resource_id: &str,
        kind: ResourceKind,
    ) -> Result<bool, LedgerError> {
        let db = self.db.clone();
        let payer = payer_id.to_string();
        let resource = resource_id.to_string();
        tokio::task::spawn_blocking(move || db.unlock_exists(&payer, &resource, kind))
            .await
            .map_err(join_err)?
            .map_err(LedgerError::Storage)
    }

    async fn append(&self, record: NewUnlockRecord) -> Result<(), LedgerError> {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || db.append_unlock_record(&record))
            .await
            .map_err(join_err)?
    }
}

#[async_trait]
impl ResourceStore for SqliteBackend {
    async fn protected_identity(
        &self,
        kind: ResourceKind,
        resource_id: &str,
    ) -> Result<Option<String>, StoreError> {
        let db = self.db.clone();
        let id = resource_id.to_string();
        tokio::task::spawn_blocking(move || db.protected_identity(kind, &id))
            .await
            .map_err(join_err)?
            .map_err(StoreError::Storage)
    }

    async fn set_unlocked_status(
        &self,
        kind: ResourceKind,
        resource_id: &str,
        payer_id: &str,
        amount: u64,
    ) -> Result<(), StoreError> {
        let db = self.db.clone();
        let resource = resource_id.to_string();
        let payer = payer_id.to_string();
        tokio::task::spawn_blocking(move || {
            // Only applications carry a denormalized status field.
            if kind == ResourceKind::ApplicationContact {
                db.set_application_paid(&resource)?;
            }
            db.insert_service_order(&payer, kind.as_str(), &resource, amount)
        })
        .await
        .map_err(join_err)?
        .map_err(StoreError::Storage)
    }
}

#[async_trait]
impl IdentityDirectory for SqliteBackend {
    async fn contact_identity(&self, user_id: &str) -> Result<Option<String>, StoreError> {
        let db = self.db.clone();
        let id = user_id.to_string();
        tokio::task::spawn_blocking(move || db.get_user_contact(&id))
            .await
            .map_err(join_err)?
            .map_err(StoreError::Storage)
    }
}
