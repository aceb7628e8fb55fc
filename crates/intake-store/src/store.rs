//! The authoritative record store.
//!
//! Each operation is one synchronous read-modify-write cycle against the
//! backing CSV file, matching the request-per-interaction model of the
//! front-end. There is no cross-process locking: two concurrent writers can
//! interleave their cycles and the last rewrite wins at file granularity.
//! That race window is accepted at this system's single-user scale.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::Timelike;

use intake_model::{FieldName, FieldValue, Filter, Profile, Record, RecordDraft, RecordId};

use crate::error::{Result, StoreError};
use crate::file;

pub struct RecordStore {
    path: PathBuf,
    profile: Profile,
    sequence: AtomicU64,
}

impl RecordStore {
    pub fn new(path: impl Into<PathBuf>, profile: Profile) -> Self {
        Self {
            path: path.into(),
            profile,
            sequence: AtomicU64::new(0),
        }
    }

    /// Create the backing file with its header row if absent. Idempotent.
    pub fn initialize(&self) -> Result<()> {
        file::initialize(&self.path, &self.profile)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Normalize, validate, stamp, and persist a new submission.
    ///
    /// The record id and the timestamp field are assigned here; the draft
    /// never carries them. Validation failures reject the submission before
    /// anything is written.
    pub fn append(&self, draft: &RecordDraft) -> Result<Record> {
        let mut values = self.profile.normalize(draft)?;
        self.profile.validate(&values)?;

        // Truncate to whole seconds to match the wire format.
        let now = chrono::Local::now().naive_local();
        let now = now.with_nanosecond(0).unwrap_or(now);
        values.insert(
            self.profile.timestamp_field.clone(),
            FieldValue::Timestamp(now),
        );

        let record = Record {
            id: self.next_id(),
            values,
        };
        self.append_existing(record.clone())?;
        tracing::info!(id = %record.id, profile = %self.profile.name, "appended record");
        Ok(record)
    }

    /// Append an already-normalized record, keeping its id and timestamp.
    /// Used by restore.
    pub fn append_existing(&self, record: Record) -> Result<()> {
        let mut records = file::read_records(&self.path, &self.profile)?;
        records.push(record);
        file::write_records(&self.path, &self.profile, &records)
    }

    /// All records in insertion order, narrowed by the filter.
    pub fn list(&self, filter: &Filter) -> Result<Vec<Record>> {
        let records = file::read_records(&self.path, &self.profile)?;
        Ok(records
            .into_iter()
            .filter(|record| filter.matches(record))
            .collect())
    }

    pub fn get(&self, id: &RecordId) -> Result<Record> {
        let records = file::read_records(&self.path, &self.profile)?;
        records
            .into_iter()
            .find(|record| record.id == *id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_hex() })
    }

    /// Apply raw field updates to the identified record and rewrite.
    ///
    /// Referencing a vanished id is a hard error, never a silent no-op.
    pub fn update(&self, id: &RecordId, updates: &[(FieldName, String)]) -> Result<Record> {
        let mut records = file::read_records(&self.path, &self.profile)?;
        let position = records
            .iter()
            .position(|record| record.id == *id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_hex() })?;

        for (name, raw) in updates {
            let def = self
                .profile
                .field(name.as_str())
                .ok_or_else(|| StoreError::UnknownField {
                    field: name.as_str().to_string(),
                })?;
            let value = FieldValue::parse(def.kind, def.name.as_str(), raw)?;
            records[position].values.insert(def.name.clone(), value);
        }

        // An update must not leave the record below the schema's
        // required-field bar.
        self.profile.validate(&records[position].values)?;

        let updated = records[position].clone();
        file::write_records(&self.path, &self.profile, &records)?;
        tracing::info!(id = %id, fields = updates.len(), "updated record");
        Ok(updated)
    }

    /// Remove the identified record and return it.
    pub fn remove(&self, id: &RecordId) -> Result<Record> {
        let mut records = file::read_records(&self.path, &self.profile)?;
        let position = records
            .iter()
            .position(|record| record.id == *id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_hex() })?;
        let removed = records.remove(position);
        file::write_records(&self.path, &self.profile, &records)?;
        Ok(removed)
    }

    pub fn count(&self) -> Result<usize> {
        Ok(file::read_records(&self.path, &self.profile)?.len())
    }

    fn next_id(&self) -> RecordId {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        RecordId::derive(&self.profile.name, nanos, sequence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn field(name: &str) -> FieldName {
        FieldName::new(name).unwrap()
    }

    fn feedback_draft(school: &str, programme: &str) -> RecordDraft {
        let mut draft = RecordDraft::new();
        draft.set(field("school"), school);
        draft.set(field("programme"), programme);
        draft
    }

    fn open_store(dir: &Path) -> RecordStore {
        let profile = Profile::visitor_feedback();
        let store = RecordStore::new(dir.join(&profile.record_file), profile);
        store.initialize().unwrap();
        store
    }

    #[test]
    fn append_then_list_round_trips_normalized_input() {
        let dir = tempdir().unwrap();
        let store = open_store(dir.path());

        let appended = store
            .append(&feedback_draft("  Riverside ", "Arts"))
            .unwrap();
        let listed = store.list(&Filter::new()).unwrap();

        assert_eq!(listed, vec![appended.clone()]);
        assert_eq!(
            appended.text(&field("school")),
            Some("Riverside".to_string())
        );
        assert!(appended.timestamp(&field("timestamp")).is_some());
    }

    #[test]
    fn append_rejects_missing_required_fields_without_writing() {
        let dir = tempdir().unwrap();
        let store = open_store(dir.path());

        let error = store.append(&RecordDraft::new()).unwrap_err();
        assert!(matches!(error, StoreError::Model(_)));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn sequential_appends_get_distinct_ids_and_both_persist() {
        let dir = tempdir().unwrap();
        let store = open_store(dir.path());

        let a = store.append(&feedback_draft("Riverside", "Arts")).unwrap();
        let b = store.append(&feedback_draft("Riverside", "Arts")).unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn update_rewrites_only_named_fields() {
        let dir = tempdir().unwrap();
        let store = open_store(dir.path());
        let record = store.append(&feedback_draft("Riverside", "Arts")).unwrap();

        let updated = store
            .update(
                &record.id,
                &[(field("comments"), "Great visit".to_string())],
            )
            .unwrap();

        assert_eq!(
            updated.text(&field("comments")),
            Some("Great visit".to_string())
        );
        assert_eq!(updated.text(&field("school")), Some("Riverside".to_string()));
    }

    #[test]
    fn update_cannot_blank_a_required_field() {
        let dir = tempdir().unwrap();
        let store = open_store(dir.path());
        let record = store.append(&feedback_draft("Riverside", "Arts")).unwrap();

        let error = store
            .update(&record.id, &[(field("school"), String::new())])
            .unwrap_err();
        assert!(matches!(error, StoreError::Model(_)));

        // Nothing was written; the record still satisfies the schema.
        let kept = store.get(&record.id).unwrap();
        assert_eq!(kept.text(&field("school")), Some("Riverside".to_string()));
    }

    #[test]
    fn update_missing_id_is_not_found() {
        let dir = tempdir().unwrap();
        let store = open_store(dir.path());
        let ghost = RecordId::derive("ghost", 0, 0);

        let error = store
            .update(&ghost, &[(field("comments"), "x".to_string())])
            .unwrap_err();
        assert!(matches!(error, StoreError::NotFound { .. }));
    }

    #[test]
    fn update_rejects_fields_outside_the_schema() {
        let dir = tempdir().unwrap();
        let store = open_store(dir.path());
        let record = store.append(&feedback_draft("Riverside", "Arts")).unwrap();

        let error = store
            .update(&record.id, &[(field("salary"), "1".to_string())])
            .unwrap_err();
        assert!(matches!(error, StoreError::UnknownField { .. }));
    }

    #[test]
    fn remove_returns_the_record_and_shrinks_the_store() {
        let dir = tempdir().unwrap();
        let store = open_store(dir.path());
        let record = store.append(&feedback_draft("Riverside", "Arts")).unwrap();

        let removed = store.remove(&record.id).unwrap();
        assert_eq!(removed.id, record.id);
        assert_eq!(store.count().unwrap(), 0);
        assert!(matches!(
            store.get(&record.id),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn list_applies_filters() {
        let dir = tempdir().unwrap();
        let store = open_store(dir.path());
        store.append(&feedback_draft("Riverside", "Arts")).unwrap();
        store.append(&feedback_draft("Lakeside", "Science")).unwrap();

        let mut filter = Filter::new();
        filter.push(intake_model::Predicate::Equals {
            field: field("programme"),
            value: "Arts".to_string(),
        });

        let matched = store.list(&filter).unwrap();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].text(&field("school")), Some("Riverside".to_string()));
    }
}
