pub mod error;
pub mod field;
pub mod filter;
pub mod record;
pub mod schema;

pub use error::{ModelError, Result};
pub use field::{DATE_FORMAT, FieldKind, FieldName, FieldValue, TIMESTAMP_FORMAT};
pub use filter::{Filter, Predicate};
pub use record::{Record, RecordDraft, RecordId};
pub use schema::{AttachmentSpec, DefaultAccount, FieldDef, Profile, choices};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_value_serializes_tagged() {
        let value = FieldValue::Rating(4);
        let json = serde_json::to_string(&value).expect("serialize field value");
        let round: FieldValue = serde_json::from_str(&json).expect("deserialize field value");
        assert_eq!(round, value);
    }

    #[test]
    fn profiles_declare_their_attachment_field() {
        let job = Profile::job_application();
        let spec = job.attachment.as_ref().expect("job profile has attachment");
        assert_eq!(spec.field.as_str(), "cv_filename");

        let feedback = Profile::visitor_feedback();
        let spec = feedback
            .attachment
            .as_ref()
            .expect("feedback profile has attachment");
        assert_eq!(spec.field.as_str(), "audio_file");
        assert_eq!(spec.subdir.as_deref(), Some("audio"));
    }
}
