//! In-process establishment store
//!
//! Same contract as the PostgreSQL repository (unique key, 0/1 counts,
//! merge-on-update) over a map guarded by an async `RwLock`. Backs the HTTP
//! contract tests and library users that need no database.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::store::EstablishmentStore;
use crate::error::{StoreError, StoreResult};
use crate::mapper::StorageRow;
use crate::models::establishment::SIRET;
use crate::models::{Siret, COLUMNS};

#[derive(Debug, Clone, Default)]
pub struct MemoryEstablishmentStore {
    rows: Arc<RwLock<BTreeMap<String, StorageRow>>>,
}

impl MemoryEstablishmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

#[async_trait]
impl EstablishmentStore for MemoryEstablishmentStore {
    async fn fetch_by_siret(&self, siret: &Siret) -> StoreResult<Option<StorageRow>> {
        Ok(self.rows.read().await.get(siret.as_str()).cloned())
    }

    async fn delete_by_siret(&self, siret: &Siret) -> StoreResult<u64> {
        let removed = self.rows.write().await.remove(siret.as_str());
        Ok(u64::from(removed.is_some()))
    }

    async fn insert(&self, row: &StorageRow) -> StoreResult<u64> {
        let siret = row
            .get(SIRET)
            .flatten()
            .ok_or_else(|| StoreError::MalformedRow {
                message: "insert without siret".to_string(),
            })?
            .to_string();

        let mut rows = self.rows.write().await;
        if rows.contains_key(&siret) {
            return Err(StoreError::Conflict { siret });
        }

        // Columns not supplied are stored as NULL, like an SQL insert.
        let mut stored = StorageRow::new();
        for &column in COLUMNS {
            stored.set(column, None);
        }
        stored.merge(row);
        rows.insert(siret, stored);
        Ok(1)
    }

    async fn update_by_siret(&self, siret: &Siret, row: &StorageRow) -> StoreResult<u64> {
        let mut rows = self.rows.write().await;
        match rows.get_mut(siret.as_str()) {
            Some(stored) => {
                stored.merge(row);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
