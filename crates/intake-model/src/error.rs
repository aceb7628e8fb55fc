use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid field name: {0:?}")]
    InvalidFieldName(String),

    #[error("invalid record id: {0:?}")]
    InvalidRecordId(String),

    #[error("field {field} expects an integer, got {value:?}")]
    InvalidInteger { field: String, value: String },

    #[error("field {field} expects a rating between 1 and 5, got {value:?}")]
    RatingOutOfRange { field: String, value: String },

    #[error("field {field} expects a date (YYYY-MM-DD), got {value:?}")]
    InvalidDate { field: String, value: String },

    #[error("field {field} expects a timestamp (YYYY-MM-DD HH:MM:SS), got {value:?}")]
    InvalidTimestamp { field: String, value: String },

    #[error("missing required fields: {}", missing.join(", "))]
    MissingRequired { missing: Vec<String> },
}

pub type Result<T> = std::result::Result<T, ModelError>;
