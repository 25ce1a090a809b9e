//! Models for the establishment registry
//!
//! This module contains the single persisted entity and its identifier type.

pub mod establishment;
pub mod siret;

// Re-export commonly used types for convenience
pub use establishment::{canonical_column, is_key_column, Establishment, COLUMNS};
pub use siret::Siret;
