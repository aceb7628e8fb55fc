//! Store error types.
//!
//! Every failure surfaces as a one-line message the front-end can show the
//! user; nothing here is retried automatically.

use std::path::PathBuf;

use thiserror::Error;

use intake_model::ModelError;

#[derive(Debug, Error)]
pub enum StoreError {
    /// File I/O error.
    #[error("Failed to {operation} file: {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV-level parse or write error.
    #[error("Record file error: {path}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A row that cannot be interpreted against the schema.
    #[error("Malformed record in {path} (row {row}): {reason}")]
    Malformed {
        path: PathBuf,
        row: usize,
        reason: String,
    },

    /// Validation or parse failure at the schema boundary.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// The identified record is in neither store.
    #[error("No record found with id {id}")]
    NotFound { id: String },

    /// An update referenced a field outside the schema.
    #[error("Unknown field for this profile: {field}")]
    UnknownField { field: String },

    /// Atomic write failed (temp file couldn't be renamed).
    #[error("Failed to complete save operation")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    /// One-line message for the submission form or dashboard.
    pub fn user_message(&self) -> String {
        match self {
            Self::Io {
                operation, path, ..
            } => format!("Could not {} the file at {}", operation, path.display()),
            Self::Csv { path, .. } => {
                format!("The record file at {} could not be read.", path.display())
            }
            Self::Malformed { path, row, .. } => format!(
                "Row {} of {} does not match the expected schema.",
                row,
                path.display()
            ),
            Self::Model(error) => error.to_string(),
            Self::NotFound { id } => {
                format!("The record {id} no longer exists. It may have been removed.")
            }
            Self::UnknownField { field } => {
                format!("This form has no field named '{field}'.")
            }
            Self::AtomicWriteFailed { target_path, .. } => format!(
                "Could not save changes to {}. Check disk space and permissions.",
                target_path.display()
            ),
        }
    }
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
