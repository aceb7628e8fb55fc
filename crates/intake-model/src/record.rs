//! Records and their generated identifiers.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDateTime;
use sha2::Digest;

use crate::error::ModelError;
use crate::field::{FieldName, FieldValue};

/// A generated record identifier.
///
/// Replaces the legacy timestamp-as-key scheme: ids are assigned at append
/// time and survive soft-delete and restore unchanged. Rendered as lowercase
/// hex in the record files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId([u8; 16]);

impl RecordId {
    /// Derive an id from the submission instant and a process-local sequence
    /// number: sha256("<source>\0<nanos>\0<sequence>"), first 16 bytes.
    pub fn derive(source: &str, nanos: u128, sequence: u64) -> Self {
        let mut hasher = sha2::Sha256::new();
        hasher.update(source.as_bytes());
        hasher.update([0u8]);
        hasher.update(nanos.to_string().as_bytes());
        hasher.update([0u8]);
        hasher.update(sequence.to_string().as_bytes());
        let digest: [u8; 32] = hasher.finalize().into();
        let mut out = [0u8; 16];
        out.copy_from_slice(&digest[..16]);
        Self(out)
    }

    pub fn from_hex(value: &str) -> Result<Self, ModelError> {
        let bytes =
            hex::decode(value.trim()).map_err(|_| ModelError::InvalidRecordId(value.to_string()))?;
        let bytes: [u8; 16] = bytes
            .try_into()
            .map_err(|_| ModelError::InvalidRecordId(value.to_string()))?;
        Ok(Self(bytes))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Raw field input as captured from a submission form, prior to
/// normalization against a schema profile.
#[derive(Debug, Clone, Default)]
pub struct RecordDraft {
    pub values: BTreeMap<FieldName, String>,
}

impl RecordDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: FieldName, value: impl Into<String>) -> &mut Self {
        self.values.insert(name, value.into());
        self
    }
}

/// One normalized submission: a value (possibly `Missing`) for every field
/// in the owning profile's schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: RecordId,
    pub values: BTreeMap<FieldName, FieldValue>,
}

impl Record {
    pub fn value(&self, name: &FieldName) -> &FieldValue {
        self.values.get(name).unwrap_or(&FieldValue::Missing)
    }

    /// Rendered text of a field, or `None` when the field is missing.
    pub fn text(&self, name: &FieldName) -> Option<String> {
        let value = self.value(name);
        if value.is_missing() {
            None
        } else {
            Some(value.render())
        }
    }

    pub fn timestamp(&self, field: &FieldName) -> Option<NaiveDateTime> {
        match self.value(field) {
            FieldValue::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_id_is_deterministic() {
        let a = RecordId::derive("visitor_feedback", 1, 1);
        let b = RecordId::derive("visitor_feedback", 1, 1);
        let c = RecordId::derive("visitor_feedback", 1, 2);
        let d = RecordId::derive("job_application", 1, 1);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
    }

    #[test]
    fn record_id_hex_round_trips() {
        let id = RecordId::derive("visitor_feedback", 42, 7);
        let parsed = RecordId::from_hex(&id.to_hex()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn from_hex_rejects_bad_input() {
        assert!(RecordId::from_hex("not-hex").is_err());
        assert!(RecordId::from_hex("abcd").is_err());
    }
}
