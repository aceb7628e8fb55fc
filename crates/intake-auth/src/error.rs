use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Failed to {operation} file: {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Credential file is not valid JSON: {path}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown role: {0:?}")]
    InvalidRole(String),

    // The legacy front-ends reported these two separately; that minor
    // disclosure is kept as-is rather than remediated here.
    #[error("Username not found")]
    UnknownUser { username: String },

    #[error("Invalid password")]
    WrongPassword,

    #[error("Session expired, please log in again")]
    SessionExpired,
}

pub type Result<T> = std::result::Result<T, AuthError>;
