//! Error types for the SIRET registry
//!
//! Validation faults are raised before any storage access; store faults come
//! from the persistence gateway; [`SiretError`] is what the service layer
//! hands to the HTTP boundary.

use std::fmt;

use thiserror::Error;

/// Client input faults. All of them map to `400 Bad Request`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Identifier '{value}' must contain only digits")]
    NotNumeric { value: String },

    #[error("Identifier '{value}' has {length} characters, expected between {min} and {max} digits")]
    BadLength {
        value: String,
        length: usize,
        min: usize,
        max: usize,
    },

    #[error("Missing required field '{field}'")]
    MissingRequired { field: &'static str },

    #[error("Unknown field '{field}'")]
    UnknownField { field: String },

    #[error("Field '{field}' must be a string, number, boolean or null")]
    InvalidValue { field: String },

    #[error("Field '{field}' = '{value}' is inconsistent with SIRET {siret}")]
    KeyMismatch {
        field: &'static str,
        value: String,
        siret: String,
    },

    #[error("Request body is not a JSON object: {message}")]
    MalformedBody { message: String },
}

/// Stable machine-readable classification of a [`ValidationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationErrorKind {
    NotNumeric,
    BadLength,
    MissingRequired,
    UnknownField,
    InvalidValue,
    KeyMismatch,
    MalformedBody,
}

impl ValidationErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotNumeric => "NOT_NUMERIC",
            Self::BadLength => "BAD_LENGTH",
            Self::MissingRequired => "MISSING_REQUIRED",
            Self::UnknownField => "UNKNOWN_FIELD",
            Self::InvalidValue => "INVALID_VALUE",
            Self::KeyMismatch => "KEY_MISMATCH",
            Self::MalformedBody => "MALFORMED_BODY",
        }
    }
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ValidationError {
    pub fn kind(&self) -> ValidationErrorKind {
        match self {
            Self::NotNumeric { .. } => ValidationErrorKind::NotNumeric,
            Self::BadLength { .. } => ValidationErrorKind::BadLength,
            Self::MissingRequired { .. } => ValidationErrorKind::MissingRequired,
            Self::UnknownField { .. } => ValidationErrorKind::UnknownField,
            Self::InvalidValue { .. } => ValidationErrorKind::InvalidValue,
            Self::KeyMismatch { .. } => ValidationErrorKind::KeyMismatch,
            Self::MalformedBody { .. } => ValidationErrorKind::MalformedBody,
        }
    }
}

/// Persistence gateway faults.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SIRET {siret} already exists")]
    Conflict { siret: String },

    #[error("Storage unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),

    #[error("Malformed row: {message}")]
    MalformedRow { message: String },
}

/// Registry operation failure, as handed to the HTTP boundary.
#[derive(Error, Debug)]
pub enum SiretError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("SIRET {siret} not found")]
    NotFound { siret: String },

    #[error("SIRET {siret} already exists")]
    Conflict { siret: String },

    #[error(transparent)]
    StorageUnavailable(StoreError),
}

impl From<StoreError> for SiretError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Conflict { siret } => SiretError::Conflict { siret },
            other => SiretError::StorageUnavailable(other),
        }
    }
}

/// Result type aliases for convenience
pub type ValidationResult<T> = Result<T, ValidationError>;
pub type StoreResult<T> = Result<T, StoreError>;
pub type SiretResult<T> = Result<T, SiretError>;
