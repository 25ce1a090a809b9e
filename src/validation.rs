//! Request validation
//!
//! Pure structural checks run before any storage access: identifier shape,
//! mandatory fields, and field names against the fixed schema. Also home of
//! [`FieldSet`], the transport-agnostic wire representation of a create or
//! update payload.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::{ValidationError, ValidationResult};
use crate::models::establishment::{SIRET, TRADE_NAME};
use crate::models::{canonical_column, Siret};

/// Shortest accepted identifier (a bare SIREN).
pub const MIN_IDENTIFIER_LEN: usize = Siret::SIREN_LEN;
/// Longest accepted identifier (a full SIRET).
pub const MAX_IDENTIFIER_LEN: usize = Siret::LEN;

/// Create-time policy knobs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CreatePolicy {
    /// Reject inserts without a primary trade name (`enseigne1etablissement`).
    pub require_trade_name: bool,
}

/// Flat field set of a create or update request.
///
/// Names are normalized to lower case. A present name with a `None` value is
/// an explicit null; an absent name means "not supplied".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSet {
    fields: BTreeMap<String, Option<String>>,
}

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl AsRef<str>, value: Option<String>) {
        self.fields
            .insert(name.as_ref().trim().to_ascii_lowercase(), value);
    }

    /// Query-string binding: an empty value stands for null.
    pub fn from_query_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut set = Self::new();
        for (name, value) in pairs {
            let value: String = value.into();
            set.insert(name, (!value.is_empty()).then_some(value));
        }
        set
    }

    /// JSON binding: the body must be an object whose values are scalars or
    /// null. Numbers and booleans keep their textual form.
    pub fn from_json(value: Value) -> ValidationResult<Self> {
        let Value::Object(map) = value else {
            return Err(ValidationError::MalformedBody {
                message: "expected a JSON object".to_string(),
            });
        };

        let mut set = Self::new();
        for (name, value) in map {
            let value = match value {
                Value::Null => None,
                Value::String(s) => Some(s),
                Value::Bool(b) => Some(b.to_string()),
                Value::Number(n) => Some(n.to_string()),
                Value::Array(_) | Value::Object(_) => {
                    return Err(ValidationError::InvalidValue { field: name });
                }
            };
            set.insert(name, value);
        }
        Ok(set)
    }

    pub fn from_json_slice(bytes: &[u8]) -> ValidationResult<Self> {
        let value: Value =
            serde_json::from_slice(bytes).map_err(|e| ValidationError::MalformedBody {
                message: e.to_string(),
            })?;
        Self::from_json(value)
    }

    /// Merge `other` into `self`; fields of `other` win.
    pub fn extend(&mut self, other: FieldSet) {
        self.fields.extend(other.fields);
    }

    /// `None` when the field was not supplied, `Some(None)` for explicit null.
    pub fn get(&self, name: &str) -> Option<Option<&str>> {
        self.fields
            .get(&name.to_ascii_lowercase())
            .map(|value| value.as_deref())
    }

    /// Supplied, non-null value of a field.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.get(name).flatten()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(&name.to_ascii_lowercase())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: AsRef<str>> FromIterator<(K, Option<String>)> for FieldSet {
    fn from_iter<T: IntoIterator<Item = (K, Option<String>)>>(iter: T) -> Self {
        let mut set = Self::new();
        for (name, value) in iter {
            set.insert(name, value);
        }
        set
    }
}

/// Check the shape of a path or payload identifier.
///
/// Non-digit content is reported before length so that e.g. `abc3425622`
/// is `NOT_NUMERIC` rather than `BAD_LENGTH`.
pub fn validate_identifier(raw: &str) -> ValidationResult<Siret> {
    if !raw.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::NotNumeric {
            value: raw.to_string(),
        });
    }

    let length = raw.len();
    if !(MIN_IDENTIFIER_LEN..=MAX_IDENTIFIER_LEN).contains(&length) {
        return Err(ValidationError::BadLength {
            value: raw.to_string(),
            length,
            min: MIN_IDENTIFIER_LEN,
            max: MAX_IDENTIFIER_LEN,
        });
    }

    Ok(Siret::from_validated(raw.to_string()))
}

/// Validate an insert payload and return its full 14-digit SIRET.
pub fn validate_create(fields: &FieldSet, policy: &CreatePolicy) -> ValidationResult<Siret> {
    check_known_fields(fields)?;

    let raw = required(fields, SIRET)?;
    if policy.require_trade_name {
        required(fields, TRADE_NAME)?;
    }

    let siret = validate_identifier(raw)?;
    if !siret.is_full() {
        // SIREN/NIC derivation needs all 14 digits.
        return Err(ValidationError::BadLength {
            value: raw.to_string(),
            length: raw.len(),
            min: Siret::LEN,
            max: Siret::LEN,
        });
    }
    Ok(siret)
}

/// Validate an update payload and return the SIRET it addresses. Every other
/// field is optional.
pub fn validate_update(fields: &FieldSet) -> ValidationResult<Siret> {
    check_known_fields(fields)?;
    let raw = required(fields, SIRET)?;
    validate_identifier(raw)
}

fn required<'a>(fields: &'a FieldSet, field: &'static str) -> ValidationResult<&'a str> {
    fields
        .value(field)
        .filter(|value| !value.trim().is_empty())
        .ok_or(ValidationError::MissingRequired { field })
}

fn check_known_fields(fields: &FieldSet) -> ValidationResult<()> {
    match fields
        .iter()
        .find(|(name, _)| canonical_column(name).is_none())
    {
        Some((name, _)) => Err(ValidationError::UnknownField {
            field: name.to_string(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationErrorKind;
    use serde_json::json;

    fn fields(pairs: &[(&str, &str)]) -> FieldSet {
        FieldSet::from_query_pairs(pairs.iter().copied())
    }

    #[test]
    fn test_identifier_accepts_siren_to_siret_lengths() {
        assert_eq!(
            validate_identifier("91158733500025").unwrap().as_str(),
            "91158733500025"
        );
        assert!(validate_identifier("911587335").is_ok());
        assert!(validate_identifier("12345678910").is_ok());
    }

    #[test]
    fn test_identifier_non_numeric_wins_over_length() {
        let err = validate_identifier("abc3425622").unwrap_err();
        assert_eq!(err.kind(), ValidationErrorKind::NotNumeric);
        let err = validate_identifier("x").unwrap_err();
        assert_eq!(err.kind(), ValidationErrorKind::NotNumeric);
        let err = validate_identifier(" 91158733500025").unwrap_err();
        assert_eq!(err.kind(), ValidationErrorKind::NotNumeric);
    }

    #[test]
    fn test_identifier_bad_length() {
        for raw in ["", "12345678", "123456789012345"] {
            let err = validate_identifier(raw).unwrap_err();
            assert_eq!(err.kind(), ValidationErrorKind::BadLength, "{raw:?}");
        }
    }

    #[test]
    fn test_create_requires_siret() {
        let err = validate_create(&fields(&[("enseigne1etablissement", "FRANPRIX")]), &CreatePolicy::default())
            .unwrap_err();
        assert_eq!(err, ValidationError::MissingRequired { field: "siret" });

        let err = validate_create(&fields(&[("siret", "")]), &CreatePolicy::default()).unwrap_err();
        assert_eq!(err, ValidationError::MissingRequired { field: "siret" });
    }

    #[test]
    fn test_create_trade_name_policy() {
        let payload = fields(&[("siret", "91158733500025")]);
        assert!(validate_create(&payload, &CreatePolicy::default()).is_ok());

        let strict = CreatePolicy {
            require_trade_name: true,
        };
        let err = validate_create(&payload, &strict).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingRequired {
                field: "enseigne1etablissement"
            }
        );

        let payload = fields(&[("siret", "91158733500025"), ("enseigne1Etablissement", "FRANPRIX")]);
        assert!(validate_create(&payload, &strict).is_ok());
    }

    #[test]
    fn test_create_needs_full_siret() {
        let err = validate_create(&fields(&[("siret", "911587335")]), &CreatePolicy::default())
            .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::BadLength { min: 14, max: 14, .. }
        ));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let payload = fields(&[("siret", "91158733500025"), ("favourite_colour", "blue")]);
        let err = validate_create(&payload, &CreatePolicy::default()).unwrap_err();
        assert_eq!(err.kind(), ValidationErrorKind::UnknownField);
        let err = validate_update(&payload).unwrap_err();
        assert_eq!(err.kind(), ValidationErrorKind::UnknownField);
    }

    #[test]
    fn test_update_only_requires_siret() {
        let err = validate_update(&fields(&[("enseigne1etablissement", "X")])).unwrap_err();
        assert_eq!(err, ValidationError::MissingRequired { field: "siret" });
        let siret = validate_update(&fields(&[("siret", "91158733500025")])).unwrap();
        assert_eq!(siret.as_str(), "91158733500025");
    }

    #[test]
    fn test_json_binding() {
        let set = FieldSet::from_json(json!({
            "siret": "91158733500025",
            "enseigne2Etablissement": null,
            "nombreperiodesetablissement": 2,
            "etablissementsiege": true
        }))
        .unwrap();
        assert_eq!(set.value("siret"), Some("91158733500025"));
        assert_eq!(set.get("enseigne2etablissement"), Some(None));
        assert_eq!(set.value("nombreperiodesetablissement"), Some("2"));
        assert_eq!(set.value("etablissementsiege"), Some("true"));
        assert_eq!(set.get("datedebut"), None);
    }

    #[test]
    fn test_json_binding_rejects_nested_values() {
        let err = FieldSet::from_json(json!({"siret": ["1"]})).unwrap_err();
        assert_eq!(err.kind(), ValidationErrorKind::InvalidValue);
        let err = FieldSet::from_json(json!(["siret"])).unwrap_err();
        assert_eq!(err.kind(), ValidationErrorKind::MalformedBody);
        let err = FieldSet::from_json_slice(b"{not json").unwrap_err();
        assert_eq!(err.kind(), ValidationErrorKind::MalformedBody);
    }

    #[test]
    fn test_query_binding_empty_is_null_and_body_wins() {
        let mut set = fields(&[("siret", "91158733500025"), ("datedebut", "")]);
        assert_eq!(set.get("datedebut"), Some(None));

        set.extend(fields(&[("datedebut", "2022-07-01")]));
        assert_eq!(set.value("datedebut"), Some("2022-07-01"));
        assert_eq!(set.len(), 2);
    }
}
