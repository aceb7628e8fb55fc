//! The soft-delete ledger.
//!
//! A second store of the same shape as the record file, holding entries
//! removed from the primary store until they are restored or purged. Same
//! full-rewrite-per-mutation behavior; there is deliberately no transaction
//! spanning the store/ledger pair, so a crash between the two halves of a
//! move can leave a record present in both files (or neither side of a
//! restore). See `Desk` for the ordering that bounds that window.

use std::path::{Path, PathBuf};

use intake_model::{Profile, Record, RecordId};

use crate::error::{Result, StoreError};
use crate::file;

pub struct Ledger {
    path: PathBuf,
    profile: Profile,
}

impl Ledger {
    pub fn new(path: impl Into<PathBuf>, profile: Profile) -> Self {
        Self {
            path: path.into(),
            profile,
        }
    }

    /// Create the backing file with its header row if absent. Idempotent.
    pub fn initialize(&self) -> Result<()> {
        file::initialize(&self.path, &self.profile)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Move-in half of a soft delete: append the record as-is.
    pub fn add(&self, record: Record) -> Result<()> {
        let mut records = file::read_records(&self.path, &self.profile)?;
        records.push(record);
        file::write_records(&self.path, &self.profile, &records)
    }

    pub fn list(&self) -> Result<Vec<Record>> {
        file::read_records(&self.path, &self.profile)
    }

    pub fn get(&self, id: &RecordId) -> Result<Record> {
        let records = file::read_records(&self.path, &self.profile)?;
        records
            .into_iter()
            .find(|record| record.id == *id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_hex() })
    }

    /// Move-out half of a restore or purge: remove the entry and hand it
    /// back. `NotFound` if the id is not in the ledger.
    pub fn remove_and_return(&self, id: &RecordId) -> Result<Record> {
        let mut records = file::read_records(&self.path, &self.profile)?;
        let position = records
            .iter()
            .position(|record| record.id == *id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_hex() })?;
        let removed = records.remove(position);
        file::write_records(&self.path, &self.profile, &records)?;
        Ok(removed)
    }

    /// Drop every entry, returning what was held. Used by purge-all.
    pub fn drain(&self) -> Result<Vec<Record>> {
        let records = file::read_records(&self.path, &self.profile)?;
        file::write_records(&self.path, &self.profile, &[])?;
        Ok(records)
    }

    pub fn count(&self) -> Result<usize> {
        Ok(file::read_records(&self.path, &self.profile)?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intake_model::{FieldName, RecordDraft};
    use tempfile::tempdir;

    fn sample_record(profile: &Profile, sequence: u64) -> Record {
        let mut draft = RecordDraft::new();
        draft.set(FieldName::new("school").unwrap(), "Riverside");
        draft.set(FieldName::new("programme").unwrap(), "Arts");
        Record {
            id: RecordId::derive(&profile.name, 9, sequence),
            values: profile.normalize(&draft).unwrap(),
        }
    }

    fn open_ledger(dir: &Path) -> Ledger {
        let profile = Profile::visitor_feedback();
        let ledger = Ledger::new(dir.join("deleted_entries.csv"), profile);
        ledger.initialize().unwrap();
        ledger
    }

    #[test]
    fn add_then_remove_and_return_round_trips() {
        let dir = tempdir().unwrap();
        let ledger = open_ledger(dir.path());
        let record = sample_record(&Profile::visitor_feedback(), 1);

        ledger.add(record.clone()).unwrap();
        assert_eq!(ledger.count().unwrap(), 1);

        let returned = ledger.remove_and_return(&record.id).unwrap();
        assert_eq!(returned, record);
        assert_eq!(ledger.count().unwrap(), 0);
    }

    #[test]
    fn remove_missing_entry_is_not_found() {
        let dir = tempdir().unwrap();
        let ledger = open_ledger(dir.path());
        let ghost = RecordId::derive("ghost", 0, 0);

        assert!(matches!(
            ledger.remove_and_return(&ghost),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn drain_empties_the_ledger_and_returns_entries() {
        let dir = tempdir().unwrap();
        let ledger = open_ledger(dir.path());
        let profile = Profile::visitor_feedback();
        ledger.add(sample_record(&profile, 1)).unwrap();
        ledger.add(sample_record(&profile, 2)).unwrap();

        let drained = ledger.drain().unwrap();
        assert_eq!(drained.len(), 2);
        assert_eq!(ledger.count().unwrap(), 0);
    }
}
