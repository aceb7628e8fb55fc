//! Lifecycle orchestration for one profile's records.
//!
//! A `Desk` owns the active store, the soft-delete ledger, and the
//! attachment directory for a single schema profile, and implements the
//! record state machine:
//!
//! ```text
//! Active --soft_delete--> Deleted --restore--> Active
//! Active|Deleted --purge--> gone (terminal, attachment removed)
//! ```
//!
//! Moves across the store/ledger pair are two separate file rewrites with
//! no transaction between them. Both moves write the destination before
//! the source, so a crash in the window duplicates a record rather than
//! losing it.

use std::fs;
use std::path::{Path, PathBuf};

use intake_model::{FieldValue, Filter, Profile, Record, RecordDraft, RecordId};

use crate::attachment::AttachmentStore;
use crate::backup;
use crate::error::{Result, StoreError};
use crate::ledger::Ledger;
use crate::store::RecordStore;

/// Ledger file name, shared by both profiles (they never share a data dir).
const LEDGER_FILE: &str = "deleted_entries.csv";

/// Backup directory name under the data dir.
const BACKUP_DIR: &str = "backups";

/// An uploaded binary accompanying a submission.
#[derive(Debug, Clone)]
pub struct NewAttachment {
    /// File extension without the leading dot, e.g. `pdf` or `wav`.
    pub extension: String,
    pub bytes: Vec<u8>,
}

/// Aggregates for the review dashboard.
#[derive(Debug, Clone)]
pub struct DeskStats {
    pub total: usize,
    pub deleted: usize,
    pub with_attachment: usize,
    /// `(field, average)` per rating field; `None` when no record rated it.
    pub rating_averages: Vec<(String, Option<f64>)>,
}

pub struct Desk {
    profile: Profile,
    store: RecordStore,
    ledger: Ledger,
    attachments: AttachmentStore,
    backup_dir: PathBuf,
}

impl Desk {
    /// Open (and initialize on first run) the data directory for a profile.
    pub fn open(data_dir: &Path, profile: Profile) -> Result<Self> {
        fs::create_dir_all(data_dir).map_err(|e| StoreError::Io {
            operation: "create directory",
            path: data_dir.to_path_buf(),
            source: e,
        })?;

        let attachment_dir = match profile.attachment.as_ref().and_then(|a| a.subdir.as_ref()) {
            Some(subdir) => data_dir.join(subdir),
            None => data_dir.to_path_buf(),
        };

        let store = RecordStore::new(data_dir.join(&profile.record_file), profile.clone());
        let ledger = Ledger::new(data_dir.join(LEDGER_FILE), profile.clone());
        store.initialize()?;
        ledger.initialize()?;

        Ok(Self {
            profile,
            store,
            ledger,
            attachments: AttachmentStore::new(attachment_dir),
            backup_dir: data_dir.join(BACKUP_DIR),
        })
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn attachments(&self) -> &AttachmentStore {
        &self.attachments
    }

    /// Accept one submission: store the attachment (if any), then append
    /// the record with the attachment field pointing at the stored file.
    ///
    /// The draft is validated up front so a rejected submission writes
    /// nothing, not even the attachment.
    pub fn submit(&self, draft: &RecordDraft, attachment: Option<&NewAttachment>) -> Result<Record> {
        self.profile.validate(&self.profile.normalize(draft)?)?;

        let mut draft = draft.clone();

        if let (Some(upload), Some(spec)) = (attachment, self.profile.attachment.as_ref()) {
            let labels: Vec<String> = spec
                .label_fields
                .iter()
                .filter_map(|name| draft.values.get(name))
                .map(|value| value.trim().to_string())
                .collect();
            let now = chrono::Local::now().naive_local();
            let filename =
                self.attachments
                    .store(spec, &labels, now, &upload.extension, &upload.bytes)?;
            draft.set(spec.field.clone(), filename);
        }

        self.store.append(&draft)
    }

    pub fn list(&self, filter: &Filter) -> Result<Vec<Record>> {
        self.store.list(filter)
    }

    pub fn deleted(&self) -> Result<Vec<Record>> {
        self.ledger.list()
    }

    /// Active -> Deleted. Ledger gains the record before the store drops it.
    pub fn soft_delete(&self, id: &RecordId) -> Result<Record> {
        let record = self.store.get(id)?;
        self.ledger.add(record.clone())?;
        self.store.remove(id)?;
        tracing::info!(%id, "soft-deleted record");
        Ok(record)
    }

    /// Deleted -> Active, keeping the original id and timestamp. The store
    /// gains the record before the ledger drops it.
    pub fn restore(&self, id: &RecordId) -> Result<Record> {
        let record = self.ledger.get(id)?;
        self.store.append_existing(record.clone())?;
        self.ledger.remove_and_return(id)?;
        tracing::info!(%id, "restored record");
        Ok(record)
    }

    /// Permanent delete from whichever side currently holds the record,
    /// removing its attachment as well. Attachment failures are warn-only
    /// and never fail the purge.
    pub fn purge(&self, id: &RecordId) -> Result<Record> {
        let record = match self.store.remove(id) {
            Ok(record) => record,
            Err(StoreError::NotFound { .. }) => self.ledger.remove_and_return(id)?,
            Err(error) => return Err(error),
        };
        self.delete_attachment_of(&record);
        tracing::info!(%id, "purged record");
        Ok(record)
    }

    /// Restore every ledger entry. Returns how many came back.
    pub fn restore_all(&self) -> Result<usize> {
        let entries = self.ledger.list()?;
        let count = entries.len();
        for record in entries {
            self.store.append_existing(record.clone())?;
            self.ledger.remove_and_return(&record.id)?;
        }
        Ok(count)
    }

    /// Purge every ledger entry along with its attachment.
    pub fn purge_all_deleted(&self) -> Result<usize> {
        let drained = self.ledger.drain()?;
        for record in &drained {
            self.delete_attachment_of(record);
        }
        Ok(drained.len())
    }

    pub fn backup(&self) -> Result<PathBuf> {
        backup::create_backup(self.store.path(), &self.backup_dir)
    }

    /// Absolute path of a record's attachment, if it references one.
    pub fn attachment_path(&self, record: &Record) -> Option<PathBuf> {
        let spec = self.profile.attachment.as_ref()?;
        match record.value(&spec.field) {
            FieldValue::Attachment(filename) => Some(self.attachments.path_of(filename)),
            _ => None,
        }
    }

    /// Aggregate counts and rating averages over the active store.
    pub fn stats(&self) -> Result<DeskStats> {
        let records = self.store.list(&Filter::new())?;
        let deleted = self.ledger.count()?;

        let with_attachment = match self.profile.attachment.as_ref() {
            Some(spec) => records
                .iter()
                .filter(|record| !record.value(&spec.field).is_missing())
                .count(),
            None => 0,
        };

        let rating_averages = self
            .profile
            .rating_fields()
            .map(|name| {
                let ratings: Vec<u8> = records
                    .iter()
                    .filter_map(|record| record.value(name).as_rating())
                    .collect();
                let average = if ratings.is_empty() {
                    None
                } else {
                    Some(f64::from(ratings.iter().map(|r| u32::from(*r)).sum::<u32>())
                        / ratings.len() as f64)
                };
                (name.as_str().to_string(), average)
            })
            .collect();

        Ok(DeskStats {
            total: records.len(),
            deleted,
            with_attachment,
            rating_averages,
        })
    }

    fn delete_attachment_of(&self, record: &Record) {
        if let Some(spec) = self.profile.attachment.as_ref()
            && let FieldValue::Attachment(filename) = record.value(&spec.field)
        {
            self.attachments.delete_best_effort(filename);
        }
    }
}
