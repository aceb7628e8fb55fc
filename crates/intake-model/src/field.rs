//! Field names, kinds, and typed cell values.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::ModelError;

/// Wire format for timestamps, identical to the legacy record files.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Wire format for dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FieldName(String);

impl FieldName {
    pub fn new(value: impl Into<String>) -> Result<Self, ModelError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ModelError::InvalidFieldName(value));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The type a schema field carries on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum FieldKind {
    Text,
    Integer,
    /// 1-5 inclusive.
    Rating,
    /// `YYYY-MM-DD`.
    Date,
    /// `YYYY-MM-DD HH:MM:SS`.
    Timestamp,
    /// Relative filename of a binary stored outside the record file.
    Attachment,
}

/// A single normalized cell.
///
/// Every record carries exactly one value (possibly `Missing`) per schema
/// field. Empty or whitespace-only input normalizes to `Missing`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum FieldValue {
    Missing,
    Text(String),
    Integer(i64),
    Rating(u8),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    Attachment(String),
}

impl FieldValue {
    /// Parse raw text into a typed value for the given kind.
    ///
    /// Input is trimmed first; empty input is `Missing` for every kind.
    pub fn parse(kind: FieldKind, field: &str, raw: &str) -> Result<Self, ModelError> {
        let value = raw.trim();
        if value.is_empty() {
            return Ok(Self::Missing);
        }
        match kind {
            FieldKind::Text => Ok(Self::Text(value.to_string())),
            FieldKind::Integer => value.parse::<i64>().map(Self::Integer).map_err(|_| {
                ModelError::InvalidInteger {
                    field: field.to_string(),
                    value: value.to_string(),
                }
            }),
            FieldKind::Rating => match value.parse::<u8>() {
                Ok(rating @ 1..=5) => Ok(Self::Rating(rating)),
                _ => Err(ModelError::RatingOutOfRange {
                    field: field.to_string(),
                    value: value.to_string(),
                }),
            },
            FieldKind::Date => NaiveDate::parse_from_str(value, DATE_FORMAT)
                .map(Self::Date)
                .map_err(|_| ModelError::InvalidDate {
                    field: field.to_string(),
                    value: value.to_string(),
                }),
            FieldKind::Timestamp => NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
                .map(Self::Timestamp)
                .map_err(|_| ModelError::InvalidTimestamp {
                    field: field.to_string(),
                    value: value.to_string(),
                }),
            FieldKind::Attachment => Ok(Self::Attachment(value.to_string())),
        }
    }

    /// Render back to the wire representation. `Missing` renders empty.
    pub fn render(&self) -> String {
        match self {
            Self::Missing => String::new(),
            Self::Text(value) | Self::Attachment(value) => value.clone(),
            Self::Integer(value) => value.to_string(),
            Self::Rating(value) => value.to_string(),
            Self::Date(value) => value.format(DATE_FORMAT).to_string(),
            Self::Timestamp(value) => value.format(TIMESTAMP_FORMAT).to_string(),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// The date component, if this cell holds one.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(date) => Some(*date),
            Self::Timestamp(ts) => Some(ts.date()),
            _ => None,
        }
    }

    pub fn as_rating(&self) -> Option<u8> {
        match self {
            Self::Rating(rating) => Some(*rating),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_missing_for_every_kind() {
        for kind in [
            FieldKind::Text,
            FieldKind::Integer,
            FieldKind::Rating,
            FieldKind::Date,
            FieldKind::Timestamp,
            FieldKind::Attachment,
        ] {
            let value = FieldValue::parse(kind, "f", "   ").unwrap();
            assert!(value.is_missing());
        }
    }

    #[test]
    fn text_is_trimmed() {
        let value = FieldValue::parse(FieldKind::Text, "school", "  Riverside  ").unwrap();
        assert_eq!(value, FieldValue::Text("Riverside".to_string()));
    }

    #[test]
    fn rating_rejects_out_of_range() {
        assert!(FieldValue::parse(FieldKind::Rating, "fun", "5").is_ok());
        assert!(FieldValue::parse(FieldKind::Rating, "fun", "0").is_err());
        assert!(FieldValue::parse(FieldKind::Rating, "fun", "6").is_err());
        assert!(FieldValue::parse(FieldKind::Rating, "fun", "great").is_err());
    }

    #[test]
    fn date_round_trips() {
        let value = FieldValue::parse(FieldKind::Date, "visit_date", "2025-03-14").unwrap();
        assert_eq!(value.render(), "2025-03-14");
    }

    #[test]
    fn timestamp_round_trips() {
        let raw = "2025-03-14 09:26:53";
        let value = FieldValue::parse(FieldKind::Timestamp, "timestamp", raw).unwrap();
        assert_eq!(value.render(), raw);
    }
}
