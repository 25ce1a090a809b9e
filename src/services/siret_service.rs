//! SIRET registry service
//!
//! Composes the request validator, the record mapper and an injected
//! [`EstablishmentStore`]. Validation and mapping faults are returned before
//! the store is touched.

use std::sync::Arc;

use tracing::{debug, info};

use crate::database::EstablishmentStore;
use crate::error::{SiretError, SiretResult};
use crate::mapper::{from_storage_row, partial_row, record_from_fields, to_storage_row};
use crate::models::establishment::SIRET;
use crate::models::Establishment;
use crate::validation::{
    validate_create, validate_identifier, validate_update, CreatePolicy, FieldSet,
};

#[derive(Clone)]
pub struct SiretService {
    store: Arc<dyn EstablishmentStore>,
    policy: CreatePolicy,
}

impl SiretService {
    pub fn new(store: Arc<dyn EstablishmentStore>, policy: CreatePolicy) -> Self {
        Self { store, policy }
    }

    /// Fetch one record by identifier.
    pub async fn get(&self, raw_id: &str) -> SiretResult<Establishment> {
        let siret = validate_identifier(raw_id)?;
        match self.store.fetch_by_siret(&siret).await? {
            Some(row) => Ok(from_storage_row(&row)?),
            None => Err(SiretError::NotFound {
                siret: siret.into_inner(),
            }),
        }
    }

    /// Delete one record. A second delete of the same identifier is
    /// `NotFound`, not a storage fault.
    pub async fn delete(&self, raw_id: &str) -> SiretResult<()> {
        let siret = validate_identifier(raw_id)?;
        let deleted = self.store.delete_by_siret(&siret).await?;
        debug!(%siret, deleted, "delete");
        if deleted == 0 {
            return Err(SiretError::NotFound {
                siret: siret.into_inner(),
            });
        }
        info!(%siret, "Establishment deleted");
        Ok(())
    }

    /// Insert a new record and return it as stored (SIREN/NIC derived).
    pub async fn create(&self, fields: &FieldSet) -> SiretResult<Establishment> {
        let siret = validate_create(fields, &self.policy)?;
        let record = record_from_fields(&siret, fields)?;

        self.store.insert(&to_storage_row(&record)).await?;
        info!(%siret, "Establishment added");
        Ok(record)
    }

    /// Partially update the record addressed by `raw_id`. Only the supplied
    /// fields are written; a `siret` in the payload must equal `raw_id`.
    pub async fn update(&self, raw_id: &str, fields: FieldSet) -> SiretResult<()> {
        let siret = validate_identifier(raw_id)?;

        let mut fields = fields;
        if !fields.contains(SIRET) {
            fields.insert(SIRET, Some(siret.to_string()));
        }
        validate_update(&fields)?;
        let row = partial_row(&siret, &fields)?;

        let updated = self.store.update_by_siret(&siret, &row).await?;
        if updated == 0 {
            return Err(SiretError::NotFound {
                siret: siret.into_inner(),
            });
        }
        info!(%siret, columns = row.len(), "Establishment updated");
        Ok(())
    }

    /// Storage connectivity probe.
    pub async fn health(&self) -> SiretResult<()> {
        self.store.ping().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryEstablishmentStore;
    use crate::error::{ValidationError, ValidationErrorKind};

    fn service() -> SiretService {
        SiretService::new(
            Arc::new(MemoryEstablishmentStore::new()),
            CreatePolicy::default(),
        )
    }

    fn franprix() -> FieldSet {
        FieldSet::from_query_pairs([
            ("siret", "91158733500025"),
            ("enseigne1etablissement", "FRANPRIX"),
            ("libellecommuneetablissement", "VILLEJUIF"),
            ("codepostaletablissement", "94800"),
        ])
    }

    #[tokio::test]
    async fn test_create_then_get_round_trips() {
        let service = service();
        let created = service.create(&franprix()).await.unwrap();
        assert_eq!(created.siren.as_deref(), Some("911587335"));
        assert_eq!(created.nic.as_deref(), Some("00025"));

        let fetched = service.get("91158733500025").await.unwrap();
        assert_eq!(fetched, created);
        for (name, value) in franprix().iter() {
            assert_eq!(fetched.field(name), value);
        }
    }

    #[tokio::test]
    async fn test_duplicate_create_conflicts() {
        let service = service();
        service.create(&franprix()).await.unwrap();
        let err = service.create(&franprix()).await.unwrap_err();
        assert!(matches!(err, SiretError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_get_missing_and_malformed() {
        let service = service();
        assert!(matches!(
            service.get("12345678910").await.unwrap_err(),
            SiretError::NotFound { .. }
        ));
        match service.get("abc3425622").await.unwrap_err() {
            SiretError::Validation(err) => assert_eq!(err.kind(), ValidationErrorKind::NotNumeric),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_delete_twice() {
        let service = service();
        service.create(&franprix()).await.unwrap();
        service.delete("91158733500025").await.unwrap();
        assert!(matches!(
            service.delete("91158733500025").await.unwrap_err(),
            SiretError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_partial_update_preserves_other_fields() {
        let service = service();
        service.create(&franprix()).await.unwrap();

        let patch = FieldSet::from_query_pairs([("enseigne1etablissement", "MONOPRIX")]);
        service.update("91158733500025", patch).await.unwrap();

        let fetched = service.get("91158733500025").await.unwrap();
        assert_eq!(fetched.enseigne1etablissement.as_deref(), Some("MONOPRIX"));
        assert_eq!(fetched.libellecommuneetablissement.as_deref(), Some("VILLEJUIF"));
        assert_eq!(fetched.codepostaletablissement.as_deref(), Some("94800"));
        assert_eq!(fetched.siren.as_deref(), Some("911587335"));
    }

    #[tokio::test]
    async fn test_update_cannot_change_key() {
        let service = service();
        service.create(&franprix()).await.unwrap();

        let patch = FieldSet::from_query_pairs([("siret", "91158733500026")]);
        match service.update("91158733500025", patch).await.unwrap_err() {
            SiretError::Validation(ValidationError::KeyMismatch { field, .. }) => {
                assert_eq!(field, "siret")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_update_missing_row_is_not_found() {
        let service = service();
        let patch = FieldSet::from_query_pairs([("enseigne1etablissement", "MONOPRIX")]);
        assert!(matches!(
            service.update("91158733500025", patch).await.unwrap_err(),
            SiretError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_trade_name_policy_enforced_before_storage() {
        let store = Arc::new(MemoryEstablishmentStore::new());
        let service = SiretService::new(
            store.clone(),
            CreatePolicy {
                require_trade_name: true,
            },
        );
        let fields = FieldSet::from_query_pairs([("siret", "91158733500025")]);
        assert!(matches!(
            service.create(&fields).await.unwrap_err(),
            SiretError::Validation(ValidationError::MissingRequired { .. })
        ));
        assert!(store.is_empty().await);
    }
}
