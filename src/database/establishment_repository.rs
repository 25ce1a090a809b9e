//! PostgreSQL establishment repository
//!
//! Thin parameterized-statement executor over the `dataset_first_version`
//! table. Column names come from the fixed schema in
//! [`crate::models::COLUMNS`]; request data is only ever bound, never
//! interpolated.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tracing::{debug, warn};

use super::store::EstablishmentStore;
use crate::error::{StoreError, StoreResult};
use crate::mapper::StorageRow;
use crate::models::establishment::SIRET;
use crate::models::{Siret, COLUMNS};

/// Registry table name.
pub const TABLE: &str = "dataset_first_version";

#[derive(Clone)]
pub struct PgEstablishmentStore {
    pool: PgPool,
}

impl PgEstablishmentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn select_by_siret_sql() -> String {
    format!("SELECT {} FROM {TABLE} WHERE siret = $1", COLUMNS.join(", "))
}

fn storage_row(row: &PgRow) -> Result<StorageRow, sqlx::Error> {
    let mut out = StorageRow::new();
    for &column in COLUMNS {
        out.set(column, row.try_get::<Option<String>, _>(column)?);
    }
    Ok(out)
}

#[async_trait]
impl EstablishmentStore for PgEstablishmentStore {
    async fn fetch_by_siret(&self, siret: &Siret) -> StoreResult<Option<StorageRow>> {
        let row = sqlx::query(&select_by_siret_sql())
            .bind(siret.as_str())
            .fetch_optional(&self.pool)
            .await?;

        debug!(%siret, found = row.is_some(), "fetch_by_siret");
        Ok(row.as_ref().map(storage_row).transpose()?)
    }

    async fn delete_by_siret(&self, siret: &Siret) -> StoreResult<u64> {
        let result = sqlx::query(&format!("DELETE FROM {TABLE} WHERE siret = $1"))
            .bind(siret.as_str())
            .execute(&self.pool)
            .await?;

        debug!(%siret, deleted = result.rows_affected(), "delete_by_siret");
        Ok(result.rows_affected())
    }

    async fn insert(&self, row: &StorageRow) -> StoreResult<u64> {
        let siret = row.get(SIRET).flatten().unwrap_or_default().to_string();

        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("INSERT INTO {TABLE} ("));
        {
            let mut columns = builder.separated(", ");
            for column in row.columns() {
                columns.push(column);
            }
        }
        builder.push(") VALUES (");
        {
            let mut values = builder.separated(", ");
            for (_, value) in row.cells() {
                values.push_bind(value.clone());
            }
        }
        builder.push(")");

        match builder.build().execute(&self.pool).await {
            Ok(result) => {
                debug!(%siret, inserted = result.rows_affected(), "insert");
                Ok(result.rows_affected())
            }
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                warn!(%siret, "insert rejected: duplicate siret");
                Err(StoreError::Conflict { siret })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update_by_siret(&self, siret: &Siret, row: &StorageRow) -> StoreResult<u64> {
        if row.is_empty() {
            let count: i64 =
                sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {TABLE} WHERE siret = $1"))
                    .bind(siret.as_str())
                    .fetch_one(&self.pool)
                    .await?;
            return Ok(count as u64);
        }

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!("UPDATE {TABLE} SET "));
        {
            let mut assignments = builder.separated(", ");
            for (column, value) in row.cells() {
                assignments.push(format!("{column} = "));
                assignments.push_bind_unseparated(value.clone());
            }
        }
        builder.push(" WHERE siret = ");
        builder.push_bind(siret.as_str().to_string());

        let result = builder.build().execute(&self.pool).await?;
        debug!(
            %siret,
            columns = row.len(),
            updated = result.rows_affected(),
            "update_by_siret"
        );
        Ok(result.rows_affected())
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
