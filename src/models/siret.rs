//! Validated establishment identifier.

use std::fmt;

use serde::Serialize;

/// Digit string of 9 to 14 characters accepted as a lookup key.
///
/// A full SIRET is 14 digits: the 9-digit SIREN of the legal entity followed
/// by the 5-digit NIC of the establishment. Shorter identifiers (down to a
/// bare SIREN) are tolerated for lookups but cannot be decomposed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Siret(String);

impl Siret {
    pub const SIREN_LEN: usize = 9;
    pub const NIC_LEN: usize = 5;
    pub const LEN: usize = Self::SIREN_LEN + Self::NIC_LEN;

    /// Callers must have checked the digit/length rules already; see
    /// [`crate::validation::validate_identifier`].
    pub(crate) fn from_validated(digits: String) -> Self {
        Self(digits)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    /// True for a complete 14-digit SIRET.
    pub fn is_full(&self) -> bool {
        self.0.len() == Self::LEN
    }

    /// Legal-entity part, only defined for a full SIRET.
    pub fn siren(&self) -> Option<&str> {
        self.is_full().then(|| &self.0[..Self::SIREN_LEN])
    }

    /// Establishment sequence part, only defined for a full SIRET.
    pub fn nic(&self) -> Option<&str> {
        self.is_full().then(|| &self.0[Self::SIREN_LEN..])
    }
}

impl fmt::Display for Siret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Siret {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
