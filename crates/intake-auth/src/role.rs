//! The closed role set gating navigation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// What a logged-in user may do.
///
/// - `Guest` submits records only (candidates and feedback guests).
/// - `Facilitator` additionally reviews and updates records.
/// - `Admin` additionally soft-deletes, restores, purges, and backs up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Guest,
    Facilitator,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Guest => "guest",
            Role::Facilitator => "facilitator",
            Role::Admin => "admin",
        }
    }

    /// Review dashboards: list, show, update.
    pub fn can_review(&self) -> bool {
        matches!(self, Role::Facilitator | Role::Admin)
    }

    /// Data management: delete, restore, purge, backup.
    pub fn can_manage(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl FromStr for Role {
    type Err = AuthError;

    /// Case-insensitive; accepts the legacy `candidate` spelling for guest
    /// accounts carried over from the job-application users file.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "guest" | "candidate" => Ok(Role::Guest),
            "facilitator" => Ok(Role::Facilitator),
            "admin" => Ok(Role::Admin),
            _ => Err(AuthError::InvalidRole(value.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
