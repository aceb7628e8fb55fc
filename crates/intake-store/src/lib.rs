//! CSV-backed record keeping for Intake Desk.
//!
//! One [`Desk`] per schema profile owns three on-disk artifacts under a
//! data directory:
//!
//! - the active record file (`candidates.csv` / `submissions.csv`),
//! - the soft-delete ledger (`deleted_entries.csv`),
//! - the attachment directory (CVs next to the record file, audio clips
//!   under `audio/`).
//!
//! Every mutation is a full-file rewrite through an atomic
//! temp-file-plus-rename, acceptable at this system's record counts. No
//! locking protects the files across processes; last rewrite wins at file
//! granularity.

pub mod attachment;
pub mod backup;
pub mod desk;
pub mod error;
pub mod file;
pub mod ledger;
pub mod store;

pub use attachment::AttachmentStore;
pub use backup::create_backup;
pub use desk::{Desk, DeskStats, NewAttachment};
pub use error::{Result, StoreError};
pub use ledger::Ledger;
pub use store::RecordStore;
