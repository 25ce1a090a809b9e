//! Persistence gateway port
//!
//! Every operation is a single statement touching at most one row, so no
//! transaction handling is needed. "No row" is always a value (an empty
//! option or a zero count), never an error.

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::mapper::StorageRow;
use crate::models::Siret;

/// Single-table establishment store keyed by SIRET.
#[async_trait]
pub trait EstablishmentStore: Send + Sync {
    /// Exact-match lookup.
    async fn fetch_by_siret(&self, siret: &Siret) -> StoreResult<Option<StorageRow>>;

    /// Number of rows removed (0 or 1).
    async fn delete_by_siret(&self, siret: &Siret) -> StoreResult<u64>;

    /// Insert one complete row. A duplicate SIRET is a
    /// [`StoreError::Conflict`](crate::error::StoreError::Conflict).
    async fn insert(&self, row: &StorageRow) -> StoreResult<u64>;

    /// Write only the cells of `row` on the row matching `siret`. Returns the
    /// number of matched rows (0 or 1); an empty `row` just reports existence.
    async fn update_by_siret(&self, siret: &Siret, row: &StorageRow) -> StoreResult<u64>;

    /// Connectivity probe.
    async fn ping(&self) -> StoreResult<()>;
}
