//! Timestamped copies of the active record file.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, StoreError};

/// Copy the record file into the backup directory as
/// `backup_<YYYYmmdd_HHMMSS>.csv` and return the new path.
pub fn create_backup(store_path: &Path, backup_dir: &Path) -> Result<PathBuf> {
    if !store_path.exists() {
        return Err(StoreError::Io {
            operation: "read",
            path: store_path.to_path_buf(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        });
    }

    fs::create_dir_all(backup_dir).map_err(|e| StoreError::Io {
        operation: "create directory",
        path: backup_dir.to_path_buf(),
        source: e,
    })?;

    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let backup_path = backup_dir.join(format!("backup_{stamp}.csv"));
    fs::copy(store_path, &backup_path).map_err(|e| StoreError::Io {
        operation: "copy",
        path: backup_path.clone(),
        source: e,
    })?;

    tracing::info!(path = %backup_path.display(), "created backup");
    Ok(backup_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn backup_copies_the_store_file() {
        let dir = tempdir().unwrap();
        let store_path = dir.path().join("submissions.csv");
        fs::write(&store_path, "id,school\n").unwrap();

        let backup_path = create_backup(&store_path, &dir.path().join("backups")).unwrap();

        assert!(backup_path.exists());
        assert_eq!(fs::read(&backup_path).unwrap(), fs::read(&store_path).unwrap());
    }

    #[test]
    fn backup_of_missing_store_fails() {
        let dir = tempdir().unwrap();
        let result = create_backup(&dir.path().join("absent.csv"), &dir.path().join("backups"));
        assert!(matches!(result, Err(StoreError::Io { .. })));
    }
}
