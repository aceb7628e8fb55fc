//! CSV file round-trip for record and ledger files.
//!
//! Wire format: one header row (`id` plus the schema fields in declared
//! order), one row per record. Every mutation rewrites the whole file
//! through a temp-file-plus-rename so a crash mid-write cannot truncate the
//! store.

use std::collections::HashMap;
use std::fs::{self, File};
use std::path::Path;

use intake_model::{FieldValue, Profile, Record, RecordId};

use crate::error::{Result, StoreError};

/// Header column holding the generated record id.
pub const ID_COLUMN: &str = "id";

/// Load every record, backfilling schema fields the file does not carry and
/// ignoring columns outside the schema.
///
/// A missing or empty file reads as an empty store. Legacy files without an
/// `id` column get deterministic ids derived from the file path and row
/// number; those become durable on the next rewrite.
pub fn read_records(path: &Path, profile: &Profile) -> Result<Vec<Record>> {
    if !path.exists() || file_is_empty(path)? {
        return Ok(Vec::new());
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| StoreError::Csv {
            path: path.to_path_buf(),
            source: e,
        })?;
    let headers = reader
        .headers()
        .map_err(|e| StoreError::Csv {
            path: path.to_path_buf(),
            source: e,
        })?
        .clone();

    let source_id = path.to_string_lossy().to_string();
    let mut records = Vec::new();
    for (idx, row) in reader.records().enumerate() {
        let row = row.map_err(|e| StoreError::Csv {
            path: path.to_path_buf(),
            source: e,
        })?;
        let row_number = idx + 1;

        let cells: HashMap<&str, &str> = headers.iter().zip(row.iter()).collect();

        let id = match cells.get(ID_COLUMN).map(|v| v.trim()) {
            Some(raw) if !raw.is_empty() => {
                RecordId::from_hex(raw).map_err(|e| StoreError::Malformed {
                    path: path.to_path_buf(),
                    row: row_number,
                    reason: e.to_string(),
                })?
            }
            _ => RecordId::derive(&source_id, 0, row_number as u64),
        };

        let mut values = std::collections::BTreeMap::new();
        for def in &profile.fields {
            let raw = cells.get(def.name.as_str()).copied().unwrap_or("");
            let value = FieldValue::parse(def.kind, def.name.as_str(), raw).map_err(|e| {
                StoreError::Malformed {
                    path: path.to_path_buf(),
                    row: row_number,
                    reason: e.to_string(),
                }
            })?;
            values.insert(def.name.clone(), value);
        }

        records.push(Record { id, values });
    }

    Ok(records)
}

/// Rewrite the full file atomically: write to a temp file, fsync, rename.
pub fn write_records(path: &Path, profile: &Profile, records: &[Record]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| StoreError::Io {
            operation: "create directory",
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let temp_path = path.with_extension("csv.tmp");
    let file = File::create(&temp_path).map_err(|e| StoreError::Io {
        operation: "create",
        path: temp_path.clone(),
        source: e,
    })?;

    let mut writer = csv::Writer::from_writer(file);

    let mut header: Vec<&str> = Vec::with_capacity(profile.fields.len() + 1);
    header.push(ID_COLUMN);
    header.extend(profile.field_names().map(|name| name.as_str()));
    writer.write_record(&header).map_err(|e| StoreError::Csv {
        path: temp_path.clone(),
        source: e,
    })?;

    for record in records {
        let mut row: Vec<String> = Vec::with_capacity(header.len());
        row.push(record.id.to_hex());
        for name in profile.field_names() {
            row.push(record.value(name).render());
        }
        writer.write_record(&row).map_err(|e| StoreError::Csv {
            path: temp_path.clone(),
            source: e,
        })?;
    }

    writer.flush().map_err(|e| StoreError::Io {
        operation: "write",
        path: temp_path.clone(),
        source: e,
    })?;
    let file = writer.into_inner().map_err(|e| StoreError::Io {
        operation: "write",
        path: temp_path.clone(),
        source: std::io::Error::other(e.to_string()),
    })?;
    file.sync_all().map_err(|e| StoreError::Io {
        operation: "sync",
        path: temp_path.clone(),
        source: e,
    })?;
    drop(file);

    fs::rename(&temp_path, path).map_err(|e| StoreError::AtomicWriteFailed {
        temp_path: temp_path.clone(),
        target_path: path.to_path_buf(),
        source: e,
    })
}

/// Create the file with a bare header row if it is absent or zero-length.
/// Idempotent.
pub fn initialize(path: &Path, profile: &Profile) -> Result<()> {
    if path.exists() && !file_is_empty(path)? {
        return Ok(());
    }
    write_records(path, profile, &[])?;
    tracing::info!(path = %path.display(), "initialized record file");
    Ok(())
}

fn file_is_empty(path: &Path) -> Result<bool> {
    let metadata = fs::metadata(path).map_err(|e| StoreError::Io {
        operation: "stat",
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(metadata.len() == 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use intake_model::{FieldName, RecordDraft};
    use tempfile::tempdir;

    fn draft_record(profile: &Profile, pairs: &[(&str, &str)]) -> Record {
        let mut draft = RecordDraft::new();
        for (name, value) in pairs {
            draft.set(FieldName::new(*name).unwrap(), *value);
        }
        Record {
            id: RecordId::derive(&profile.name, 1, 1),
            values: profile.normalize(&draft).unwrap(),
        }
    }

    #[test]
    fn missing_file_reads_empty() {
        let dir = tempdir().unwrap();
        let profile = Profile::visitor_feedback();
        let records = read_records(&dir.path().join("submissions.csv"), &profile).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn write_then_read_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("submissions.csv");
        let profile = Profile::visitor_feedback();
        let record = draft_record(
            &profile,
            &[
                ("school", "Riverside"),
                ("programme", "Arts"),
                ("engagement", "4"),
                ("comments", "Loved it, especially the \"science\" corner"),
            ],
        );

        write_records(&path, &profile, std::slice::from_ref(&record)).unwrap();
        let loaded = read_records(&path, &profile).unwrap();

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0], record);
    }

    #[test]
    fn load_backfills_missing_columns_and_ignores_unknown() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("submissions.csv");
        std::fs::write(&path, "school,mystery\nRiverside,42\n").unwrap();

        let profile = Profile::visitor_feedback();
        let records = read_records(&path, &profile).unwrap();

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(
            record.text(&FieldName::new("school").unwrap()),
            Some("Riverside".to_string())
        );
        // Every schema field is present, mystery column is gone.
        assert_eq!(record.values.len(), profile.fields.len());
        assert!(record.value(&FieldName::new("programme").unwrap()).is_missing());
    }

    #[test]
    fn legacy_rows_without_id_get_stable_ids() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("submissions.csv");
        std::fs::write(&path, "school\nRiverside\nLakeside\n").unwrap();

        let profile = Profile::visitor_feedback();
        let first = read_records(&path, &profile).unwrap();
        let second = read_records(&path, &profile).unwrap();

        assert_eq!(first[0].id, second[0].id);
        assert_ne!(first[0].id, first[1].id);
    }

    #[test]
    fn initialize_is_idempotent_and_preserves_data() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("candidates.csv");
        let profile = Profile::job_application();

        initialize(&path, &profile).unwrap();
        let record = draft_record(
            &profile,
            &[
                ("first_name", "Thandi"),
                ("last_name", "Mokoena"),
                ("email", "thandi@example.com"),
                ("phone", "0115550100"),
                ("department", "ICT"),
                ("position", "Developer"),
                ("room", "room2"),
            ],
        );
        write_records(&path, &profile, std::slice::from_ref(&record)).unwrap();

        initialize(&path, &profile).unwrap();
        assert_eq!(read_records(&path, &profile).unwrap().len(), 1);
    }

    #[test]
    fn malformed_rating_is_reported_with_row() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("submissions.csv");
        std::fs::write(&path, "school,engagement\nRiverside,excellent\n").unwrap();

        let profile = Profile::visitor_feedback();
        let error = read_records(&path, &profile).unwrap_err();
        match error {
            StoreError::Malformed { row, .. } => assert_eq!(row, 1),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
