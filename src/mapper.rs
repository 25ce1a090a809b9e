//! Record mapper
//!
//! Translates between the wire field set, the [`Establishment`] record and
//! the positional storage row. This is the only place that knows column
//! names and their order; the persistence gateway just binds what it is given.

use crate::error::{StoreError, StoreResult, ValidationError, ValidationResult};
use crate::models::establishment::{NIC, SIREN, SIRET};
use crate::models::{canonical_column, is_key_column, Establishment, Siret, COLUMNS};
use crate::validation::FieldSet;

/// Ordered `(column, value)` cells of one table row, or of the subset of
/// columns touched by a partial update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageRow {
    cells: Vec<(&'static str, Option<String>)>,
}

impl StorageRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a cell, replacing any previous value for the same column.
    pub fn set(&mut self, column: &'static str, value: Option<String>) {
        match self.cells.iter_mut().find(|(name, _)| *name == column) {
            Some((_, slot)) => *slot = value,
            None => self.cells.push((column, value)),
        }
    }

    /// `None` when the row has no such column, `Some(None)` for SQL NULL.
    pub fn get(&self, column: &str) -> Option<Option<&str>> {
        self.cells
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, value)| value.as_deref())
    }

    pub fn cells(&self) -> &[(&'static str, Option<String>)] {
        &self.cells
    }

    pub fn columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.cells.iter().map(|(name, _)| *name)
    }

    /// Overwrite the cells present in `partial`, keep every other cell.
    pub fn merge(&mut self, partial: &StorageRow) {
        for (column, value) in &partial.cells {
            self.set(*column, value.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Fill in `siren`/`nic` from the SIRET when they are null, and reject an
/// explicit value that disagrees with it.
pub fn derive_key_parts(mut record: Establishment) -> ValidationResult<Establishment> {
    if record.siret.len() != Siret::LEN || !record.siret.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::BadLength {
            value: record.siret.clone(),
            length: record.siret.len(),
            min: Siret::LEN,
            max: Siret::LEN,
        });
    }

    let (siren, nic) = record.siret.split_at(Siret::SIREN_LEN);
    let (siren, nic) = (siren.to_string(), nic.to_string());
    record.siren = Some(check_key_part(SIREN, record.siren.take(), siren, &record.siret)?);
    record.nic = Some(check_key_part(NIC, record.nic.take(), nic, &record.siret)?);
    Ok(record)
}

fn check_key_part(
    field: &'static str,
    supplied: Option<String>,
    expected: String,
    siret: &str,
) -> ValidationResult<String> {
    match supplied {
        Some(value) if value != expected => Err(ValidationError::KeyMismatch {
            field,
            value,
            siret: siret.to_string(),
        }),
        _ => Ok(expected),
    }
}

/// Build a complete record from a validated create payload.
pub fn record_from_fields(siret: &Siret, fields: &FieldSet) -> ValidationResult<Establishment> {
    let mut record = Establishment::new(siret.as_str());
    for (column, value) in resolve_columns(fields)? {
        if column == SIRET {
            continue;
        }
        if let Some(slot) = record.slot_mut(column) {
            *slot = value.map(str::to_string);
        }
    }
    derive_key_parts(record)
}

/// Columns to write for a partial update of `siret`.
///
/// The key columns never appear in the result: `siret` is immutable and
/// `siren`/`nic` follow from it. Supplying them is allowed only when they
/// agree with the addressed SIRET.
pub fn partial_row(siret: &Siret, fields: &FieldSet) -> ValidationResult<StorageRow> {
    let mut row = StorageRow::new();
    for (column, value) in resolve_columns(fields)? {
        match column {
            SIRET => {
                if value != Some(siret.as_str()) {
                    return Err(ValidationError::KeyMismatch {
                        field: SIRET,
                        value: value.unwrap_or_default().to_string(),
                        siret: siret.to_string(),
                    });
                }
            }
            SIREN | NIC => {
                let expected = if column == SIREN {
                    siret.siren()
                } else {
                    siret.nic()
                };
                if let (Some(value), Some(expected)) = (value, expected) {
                    if value != expected {
                        return Err(ValidationError::KeyMismatch {
                            field: column,
                            value: value.to_string(),
                            siret: siret.to_string(),
                        });
                    }
                }
            }
            _ => row.set(column, value.map(str::to_string)),
        }
    }
    debug_assert!(row.columns().all(|column| !is_key_column(column)));
    Ok(row)
}

/// Every column of the record, in storage order.
pub fn to_storage_row(record: &Establishment) -> StorageRow {
    let mut row = StorageRow::new();
    for &column in COLUMNS {
        row.set(column, record.field(column).map(str::to_string));
    }
    row
}

/// Inverse of [`to_storage_row`]. Missing nullable columns read as null; a
/// row without a SIRET is malformed.
pub fn from_storage_row(row: &StorageRow) -> StoreResult<Establishment> {
    let siret = row
        .get(SIRET)
        .flatten()
        .ok_or_else(|| StoreError::MalformedRow {
            message: "row has no siret".to_string(),
        })?;

    let mut record = Establishment::new(siret);
    for (column, value) in row.cells() {
        if let Some(slot) = record.slot_mut(column) {
            *slot = value.clone();
        }
    }
    Ok(record)
}

/// Map supplied field names to canonical columns, in storage order.
fn resolve_columns(fields: &FieldSet) -> ValidationResult<Vec<(&'static str, Option<&str>)>> {
    let mut resolved = Vec::with_capacity(fields.len());
    for (name, value) in fields.iter() {
        let column = canonical_column(name).ok_or_else(|| ValidationError::UnknownField {
            field: name.to_string(),
        })?;
        resolved.push((column, value));
    }
    resolved.sort_by_key(|(column, _)| COLUMNS.iter().position(|c| c == column));
    Ok(resolved)
}
