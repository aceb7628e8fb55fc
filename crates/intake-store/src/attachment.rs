//! Attachment storage.
//!
//! Each record references at most one externally stored binary (a CV
//! document or an audio clip) by filename. The store's only responsibility
//! is lifecycle coupling: save on submit, best-effort delete on purge.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use intake_model::AttachmentSpec;

use crate::error::{Result, StoreError};

/// Filename timestamp component, e.g. `20250314_092653`.
const FILE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

pub struct AttachmentStore {
    dir: PathBuf,
}

impl AttachmentStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write the attachment bytes under a deterministic name:
    /// `<prefix>[_<label>...]_<timestamp>.<extension>`.
    pub fn store(
        &self,
        spec: &AttachmentSpec,
        labels: &[String],
        timestamp: NaiveDateTime,
        extension: &str,
        bytes: &[u8],
    ) -> Result<String> {
        fs::create_dir_all(&self.dir).map_err(|e| StoreError::Io {
            operation: "create directory",
            path: self.dir.clone(),
            source: e,
        })?;

        let mut stem = spec.prefix.clone();
        for label in labels {
            stem.push('_');
            stem.push_str(&sanitize(label));
        }
        stem.push('_');
        stem.push_str(&timestamp.format(FILE_TIMESTAMP_FORMAT).to_string());

        let filename = format!("{}.{}", stem, extension.trim_start_matches('.'));
        let path = self.dir.join(&filename);
        fs::write(&path, bytes).map_err(|e| StoreError::Io {
            operation: "write",
            path: path.clone(),
            source: e,
        })?;
        tracing::debug!(path = %path.display(), "stored attachment");
        Ok(filename)
    }

    pub fn path_of(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }

    pub fn exists(&self, filename: &str) -> bool {
        self.path_of(filename).exists()
    }

    /// Attempt deletion; a failure is logged and swallowed so it never
    /// blocks the record purge it accompanies.
    pub fn delete_best_effort(&self, filename: &str) {
        let path = self.path_of(filename);
        if !path.exists() {
            return;
        }
        if let Err(error) = fs::remove_file(&path) {
            tracing::warn!(path = %path.display(), %error, "could not delete attachment");
        }
    }
}

/// Keep filenames shell- and filesystem-friendly.
fn sanitize(label: &str) -> String {
    label
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}
