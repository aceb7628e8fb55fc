//! Schema profiles.
//!
//! The two legacy applications (job-application intake and visitor-feedback
//! collection) were near line-identical copies of the same record-keeping
//! core. Here they are unified: a [`Profile`] carries the field schema,
//! attachment rules, and default accounts, and everything downstream is
//! parameterized by it.

use std::collections::BTreeMap;

use crate::error::ModelError;
use crate::field::{FieldKind, FieldName, FieldValue};
use crate::record::RecordDraft;

/// One field in a profile's fixed schema.
#[derive(Debug, Clone)]
pub struct FieldDef {
    pub name: FieldName,
    pub kind: FieldKind,
    pub required: bool,
    /// Applied when the submission omits the field entirely.
    pub default: Option<String>,
}

impl FieldDef {
    fn new(name: &str, kind: FieldKind) -> Self {
        Self {
            name: FieldName::new(name).expect("schema field names are static and non-empty"),
            kind,
            required: false,
            default: None,
        }
    }

    fn required(mut self) -> Self {
        self.required = true;
        self
    }

    fn with_default(mut self, value: &str) -> Self {
        self.default = Some(value.to_string());
        self
    }
}

/// How a profile stores and names its single optional binary attachment.
#[derive(Debug, Clone)]
pub struct AttachmentSpec {
    /// Schema field that holds the attachment filename.
    pub field: FieldName,
    /// Subdirectory under the data dir, or `None` for the data dir itself.
    pub subdir: Option<String>,
    /// Filename prefix, e.g. `cv` or `recording`.
    pub prefix: String,
    /// Fields whose values are joined into the filename for traceability.
    pub label_fields: Vec<FieldName>,
}

/// A credential seeded into the users file on first run.
#[derive(Debug, Clone)]
pub struct DefaultAccount {
    pub username: String,
    pub password: String,
    pub role: String,
}

impl DefaultAccount {
    fn new(username: &str, password: &str, role: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
            role: role.to_string(),
        }
    }
}

/// A complete application schema: field definitions in file order plus the
/// attachment rules and default accounts that go with it.
#[derive(Debug, Clone)]
pub struct Profile {
    pub name: String,
    /// Active record file name under the data dir (legacy names kept).
    pub record_file: String,
    pub fields: Vec<FieldDef>,
    /// Field stamped by the store at append time.
    pub timestamp_field: FieldName,
    pub attachment: Option<AttachmentSpec>,
    pub default_accounts: Vec<DefaultAccount>,
}

impl Profile {
    /// Candidate intake: personal details, department/position/room, CV.
    pub fn job_application() -> Self {
        let field = |name| FieldName::new(name).expect("static field name");
        Self {
            name: "job_application".to_string(),
            record_file: "candidates.csv".to_string(),
            fields: vec![
                FieldDef::new("timestamp", FieldKind::Timestamp),
                FieldDef::new("username", FieldKind::Text),
                FieldDef::new("first_name", FieldKind::Text).required(),
                FieldDef::new("last_name", FieldKind::Text).required(),
                FieldDef::new("email", FieldKind::Text).required(),
                FieldDef::new("phone", FieldKind::Text).required(),
                FieldDef::new("department", FieldKind::Text).required(),
                FieldDef::new("position", FieldKind::Text).required(),
                FieldDef::new("cv_filename", FieldKind::Attachment),
                FieldDef::new("status", FieldKind::Text).with_default("Submitted"),
                FieldDef::new("room", FieldKind::Text).required(),
                FieldDef::new("notes", FieldKind::Text),
            ],
            timestamp_field: field("timestamp"),
            attachment: Some(AttachmentSpec {
                field: field("cv_filename"),
                subdir: None,
                prefix: "cv".to_string(),
                label_fields: vec![field("first_name"), field("last_name")],
            }),
            default_accounts: vec![
                DefaultAccount::new("admin", "candidate123", "admin"),
                DefaultAccount::new("facilitator", "facilitator123", "facilitator"),
                DefaultAccount::new("candidate", "candidate123", "guest"),
            ],
        }
    }

    /// Visitor feedback: group details, visit date, six 1-5 ratings,
    /// free-text comments, optional voice recording.
    pub fn visitor_feedback() -> Self {
        let field = |name| FieldName::new(name).expect("static field name");
        Self {
            name: "visitor_feedback".to_string(),
            record_file: "submissions.csv".to_string(),
            fields: vec![
                FieldDef::new("timestamp", FieldKind::Timestamp),
                FieldDef::new("school", FieldKind::Text).required(),
                FieldDef::new("group_type", FieldKind::Text),
                FieldDef::new("children_no", FieldKind::Integer),
                FieldDef::new("children_age", FieldKind::Text),
                FieldDef::new("adults_present", FieldKind::Integer),
                FieldDef::new("visit_date", FieldKind::Date),
                FieldDef::new("programme", FieldKind::Text).required(),
                FieldDef::new("engagement", FieldKind::Rating),
                FieldDef::new("safety", FieldKind::Rating),
                FieldDef::new("cleanliness", FieldKind::Rating),
                FieldDef::new("fun", FieldKind::Rating),
                FieldDef::new("learning", FieldKind::Rating),
                FieldDef::new("planning", FieldKind::Rating),
                FieldDef::new("safety_space", FieldKind::Text),
                FieldDef::new("comments", FieldKind::Text),
                FieldDef::new("audio_file", FieldKind::Attachment),
                FieldDef::new("device_type", FieldKind::Text),
            ],
            timestamp_field: field("timestamp"),
            attachment: Some(AttachmentSpec {
                field: field("audio_file"),
                subdir: Some("audio".to_string()),
                prefix: "recording".to_string(),
                label_fields: vec![],
            }),
            default_accounts: vec![
                DefaultAccount::new("admin", "Playafrica@2025!*", "admin"),
                DefaultAccount::new("Guest", "Guest@2025", "guest"),
            ],
        }
    }

    /// Look up a built-in profile by name.
    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "job_application" => Some(Self::job_application()),
            "visitor_feedback" => Some(Self::visitor_feedback()),
            _ => None,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|def| def.name.as_str() == name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &FieldName> {
        self.fields.iter().map(|def| &def.name)
    }

    /// Fields the profile can average for its summary metrics.
    pub fn rating_fields(&self) -> impl Iterator<Item = &FieldName> {
        self.fields
            .iter()
            .filter(|def| def.kind == FieldKind::Rating)
            .map(|def| &def.name)
    }

    /// Normalize a draft against the schema.
    ///
    /// Every schema field ends up present: raw input is trimmed and parsed
    /// per kind, omitted fields take their declared default or `Missing`.
    /// Draft keys outside the schema are dropped.
    pub fn normalize(
        &self,
        draft: &RecordDraft,
    ) -> Result<BTreeMap<FieldName, FieldValue>, ModelError> {
        let mut values = BTreeMap::new();
        for def in &self.fields {
            let raw = draft
                .values
                .get(&def.name)
                .map(String::as_str)
                .or(def.default.as_deref())
                .unwrap_or("");
            let value = FieldValue::parse(def.kind, def.name.as_str(), raw)?;
            values.insert(def.name.clone(), value);
        }
        Ok(values)
    }

    /// Reject submissions with required fields still missing after
    /// normalization. All gaps are reported at once.
    pub fn validate(&self, values: &BTreeMap<FieldName, FieldValue>) -> Result<(), ModelError> {
        let missing: Vec<String> = self
            .fields
            .iter()
            .filter(|def| def.required)
            .filter(|def| values.get(&def.name).is_none_or(FieldValue::is_missing))
            .map(|def| def.name.as_str().to_string())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ModelError::MissingRequired { missing })
        }
    }
}

/// Closed value sets the legacy submission forms offered. Enforcement lives
/// in the presentation layer; the data core stores what it is given.
pub mod choices {
    pub const DEPARTMENTS: &[&str] = &[
        "ICT",
        "RETAIL",
        "VOCATIONAL",
        "AGRICULTURE",
        "SALES AND HOSPITALITY",
        "CALL CENTRE",
    ];

    pub const ROOMS: &[&str] = &["room2", "room3"];

    pub const STATUSES: &[&str] = &[
        "Submitted",
        "Under Review",
        "Interview Scheduled",
        "Completed",
    ];

    pub const GROUP_TYPES: &[&str] =
        &["School Group", "Community Group", "Family Visit", "Other"];

    pub const PROGRAMMES: &[&str] = &[
        "Creative Arts Workshop",
        "Science Discovery",
        "Storytelling Session",
        "Music & Movement",
        "Drama Workshop",
        "Other",
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_backfills_every_schema_field() {
        let profile = Profile::visitor_feedback();
        let mut draft = RecordDraft::new();
        draft.set(FieldName::new("school").unwrap(), "Riverside");
        draft.set(FieldName::new("programme").unwrap(), "Arts");

        let values = profile.normalize(&draft).unwrap();

        assert_eq!(values.len(), profile.fields.len());
        for name in profile.rating_fields() {
            assert!(values[name].is_missing());
        }
        assert_eq!(
            values[&FieldName::new("school").unwrap()],
            FieldValue::Text("Riverside".to_string())
        );
    }

    #[test]
    fn normalize_drops_unknown_fields() {
        let profile = Profile::visitor_feedback();
        let mut draft = RecordDraft::new();
        draft.set(FieldName::new("school").unwrap(), "Riverside");
        draft.set(FieldName::new("not_in_schema").unwrap(), "x");

        let values = profile.normalize(&draft).unwrap();
        assert!(!values.contains_key(&FieldName::new("not_in_schema").unwrap()));
    }

    #[test]
    fn normalize_applies_defaults() {
        let profile = Profile::job_application();
        let values = profile.normalize(&RecordDraft::new()).unwrap();
        assert_eq!(
            values[&FieldName::new("status").unwrap()],
            FieldValue::Text("Submitted".to_string())
        );
    }

    #[test]
    fn validate_reports_every_missing_required_field() {
        let profile = Profile::visitor_feedback();
        let values = profile.normalize(&RecordDraft::new()).unwrap();
        let error = profile.validate(&values).unwrap_err();
        match error {
            ModelError::MissingRequired { missing } => {
                assert_eq!(missing, vec!["school".to_string(), "programme".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn built_in_profiles_resolve_by_name() {
        assert!(Profile::by_name("job_application").is_some());
        assert!(Profile::by_name("visitor_feedback").is_some());
        assert!(Profile::by_name("unknown").is_none());
    }
}
