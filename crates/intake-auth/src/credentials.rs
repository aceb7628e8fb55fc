//! The JSON credential file.
//!
//! Shape matches the legacy `users.json`: a map from username to
//! `{ "password": <sha256 hex>, "role": <role> }`. Loaded on every login
//! attempt; never rotated by the application itself.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use intake_model::DefaultAccount;

use crate::error::{AuthError, Result};
use crate::role::Role;

/// SHA-256 of the raw password, rendered as lowercase hex. The same fixed
/// one-way hash the legacy system stored.
pub fn hash_password(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    hex::encode(hasher.finalize())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CredentialEntry {
    password: String,
    role: String,
}

pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the credential file with the profile's fixed accounts if it
    /// does not exist yet. Idempotent via file existence; never overwrites.
    /// Returns whether the file was created.
    pub fn initialize_defaults(&self, accounts: &[DefaultAccount]) -> Result<bool> {
        if self.path.exists() && !self.file_is_empty()? {
            return Ok(false);
        }

        let mut entries: BTreeMap<String, CredentialEntry> = BTreeMap::new();
        for account in accounts {
            // Validate the role spelling up front so a bad default cannot
            // produce an unreadable file.
            Role::from_str(&account.role)?;
            entries.insert(
                account.username.clone(),
                CredentialEntry {
                    password: hash_password(&account.password),
                    role: account.role.clone(),
                },
            );
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| AuthError::Io {
                operation: "create directory",
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let json = serde_json::to_string_pretty(&entries).map_err(|e| AuthError::Malformed {
            path: self.path.clone(),
            source: e,
        })?;
        fs::write(&self.path, json).map_err(|e| AuthError::Io {
            operation: "write",
            path: self.path.clone(),
            source: e,
        })?;

        tracing::info!(path = %self.path.display(), accounts = accounts.len(), "created credential file");
        Ok(true)
    }

    /// Check a login attempt. Hashes the supplied password and compares it
    /// to the stored digest; returns the account's role on match.
    pub fn verify(&self, username: &str, password: &str) -> Result<Role> {
        let entries = self.load()?;
        let entry = entries.get(username).ok_or_else(|| AuthError::UnknownUser {
            username: username.to_string(),
        })?;

        if entry.password != hash_password(password) {
            return Err(AuthError::WrongPassword);
        }
        Role::from_str(&entry.role)
    }

    fn load(&self) -> Result<BTreeMap<String, CredentialEntry>> {
        let raw = fs::read_to_string(&self.path).map_err(|e| AuthError::Io {
            operation: "read",
            path: self.path.clone(),
            source: e,
        })?;
        serde_json::from_str(&raw).map_err(|e| AuthError::Malformed {
            path: self.path.clone(),
            source: e,
        })
    }

    fn file_is_empty(&self) -> Result<bool> {
        let metadata = fs::metadata(&self.path).map_err(|e| AuthError::Io {
            operation: "stat",
            path: self.path.clone(),
            source: e,
        })?;
        Ok(metadata.len() == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intake_model::Profile;
    use tempfile::tempdir;

    fn store_with_defaults(dir: &Path, profile: &Profile) -> CredentialStore {
        let store = CredentialStore::new(dir.join("users.json"));
        assert!(store.initialize_defaults(&profile.default_accounts).unwrap());
        store
    }

    #[test]
    fn default_accounts_verify_with_their_exact_password() {
        let dir = tempdir().unwrap();
        let profile = Profile::visitor_feedback();
        let store = store_with_defaults(dir.path(), &profile);

        assert_eq!(
            store.verify("admin", "Playafrica@2025!*").unwrap(),
            Role::Admin
        );
        assert_eq!(store.verify("Guest", "Guest@2025").unwrap(), Role::Guest);
    }

    #[test]
    fn any_other_password_is_rejected() {
        let dir = tempdir().unwrap();
        let profile = Profile::visitor_feedback();
        let store = store_with_defaults(dir.path(), &profile);

        assert!(matches!(
            store.verify("admin", "Playafrica@2025!"),
            Err(AuthError::WrongPassword)
        ));
        assert!(matches!(
            store.verify("admin", ""),
            Err(AuthError::WrongPassword)
        ));
        // Hashes never match raw passwords.
        let hashed = hash_password("Playafrica@2025!*");
        assert!(matches!(
            store.verify("admin", &hashed),
            Err(AuthError::WrongPassword)
        ));
    }

    #[test]
    fn unknown_user_is_distinguished_from_wrong_password() {
        let dir = tempdir().unwrap();
        let profile = Profile::visitor_feedback();
        let store = store_with_defaults(dir.path(), &profile);

        assert!(matches!(
            store.verify("nobody", "Guest@2025"),
            Err(AuthError::UnknownUser { .. })
        ));
    }

    #[test]
    fn initialize_is_idempotent_and_preserves_edits() {
        let dir = tempdir().unwrap();
        let profile = Profile::job_application();
        let store = store_with_defaults(dir.path(), &profile);

        // Second call must not recreate or overwrite.
        assert!(!store.initialize_defaults(&profile.default_accounts).unwrap());
        assert_eq!(
            store.verify("facilitator", "facilitator123").unwrap(),
            Role::Facilitator
        );
    }

    #[test]
    fn legacy_role_spellings_still_verify() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("users.json");
        let legacy = format!(
            "{{\"candidate\": {{\"password\": \"{}\", \"role\": \"candidate\"}}}}",
            hash_password("candidate123")
        );
        fs::write(&path, legacy).unwrap();

        let store = CredentialStore::new(&path);
        assert_eq!(
            store.verify("candidate", "candidate123").unwrap(),
            Role::Guest
        );
    }
}
