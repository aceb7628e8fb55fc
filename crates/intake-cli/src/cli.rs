//! CLI argument definitions for Intake Desk.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use intake_model::Profile;

#[derive(Parser)]
#[command(
    name = "intake-desk",
    version,
    about = "Intake Desk - form-based record intake and review",
    long_about = "Record intake and review over flat CSV stores.\n\n\
                  One data directory per application profile holds the active\n\
                  record file, the soft-delete ledger, attachments, backups,\n\
                  and the credential file. Review and management commands are\n\
                  role-gated; pass --username/--password to authenticate."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Storage directory for records, credentials, attachments, and backups.
    #[arg(
        long = "data-dir",
        value_name = "DIR",
        default_value = "data",
        global = true
    )]
    pub data_dir: PathBuf,

    /// Application profile to operate on.
    #[arg(
        long = "profile",
        value_enum,
        default_value = "visitor-feedback",
        global = true
    )]
    pub profile: ProfileArg,

    /// Username for role-gated commands.
    #[arg(long = "username", value_name = "USER", global = true)]
    pub username: Option<String>,

    /// Password for role-gated commands.
    #[arg(long = "password", value_name = "PASSWORD", global = true)]
    pub password: Option<String>,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ProfileArg {
    /// Candidate intake with CV attachments.
    JobApplication,
    /// Visitor feedback with ratings and voice recordings.
    VisitorFeedback,
}

impl ProfileArg {
    pub fn to_profile(self) -> Profile {
        match self {
            ProfileArg::JobApplication => Profile::job_application(),
            ProfileArg::VisitorFeedback => Profile::visitor_feedback(),
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create the data directory, record files, and default accounts.
    Init,

    /// Check credentials and print the granted role and session expiry.
    Login(LoginArgs),

    /// Submit a new record (any authenticated user).
    Submit(SubmitArgs),

    /// List active records, optionally filtered (facilitator or admin).
    List(ListArgs),

    /// Show every field of one record (facilitator or admin).
    Show(ShowArgs),

    /// Update fields of one record (facilitator or admin).
    Update(UpdateArgs),

    /// Soft-delete a record, or remove it permanently (admin).
    Delete(DeleteArgs),

    /// List soft-deleted records pending restore or purge (admin).
    Deleted,

    /// Move a soft-deleted record back into the active store (admin).
    Restore(RestoreArgs),

    /// Permanently remove a record and its attachment (admin).
    Purge(PurgeArgs),

    /// Copy the active record file into the backups directory (admin).
    Backup,

    /// Print record counts and rating averages (facilitator or admin).
    Summary,
}

#[derive(Parser)]
pub struct LoginArgs {
    /// Account username.
    #[arg(value_name = "USER")]
    pub login_username: String,

    /// Account password.
    #[arg(value_name = "PASSWORD")]
    pub login_password: String,
}

#[derive(Parser)]
pub struct SubmitArgs {
    /// Field value as NAME=VALUE; repeat for each field.
    #[arg(long = "field", value_name = "NAME=VALUE", value_parser = parse_field)]
    pub fields: Vec<(String, String)>,

    /// Attach a file (CV document or audio clip).
    #[arg(long = "attachment", value_name = "PATH")]
    pub attachment: Option<PathBuf>,
}

#[derive(Parser)]
pub struct ListArgs {
    /// Exact-match filter as NAME=VALUE; repeat to AND filters together.
    #[arg(long = "equals", value_name = "NAME=VALUE", value_parser = parse_field)]
    pub equals: Vec<(String, String)>,

    /// Case-insensitive substring filter as NAME=VALUE.
    #[arg(long = "contains", value_name = "NAME=VALUE", value_parser = parse_field)]
    pub contains: Vec<(String, String)>,

    /// Keep records dated on or after this day (YYYY-MM-DD).
    #[arg(long = "from", value_name = "DATE")]
    pub from: Option<NaiveDate>,

    /// Keep records dated on or before this day (YYYY-MM-DD).
    #[arg(long = "to", value_name = "DATE")]
    pub to: Option<NaiveDate>,

    /// Field the date range applies to (default: the timestamp field).
    #[arg(long = "date-field", value_name = "NAME")]
    pub date_field: Option<String>,
}

#[derive(Parser)]
pub struct ShowArgs {
    /// Record id (hex, as printed by list).
    #[arg(value_name = "ID")]
    pub id: String,
}

#[derive(Parser)]
pub struct UpdateArgs {
    /// Record id (hex, as printed by list).
    #[arg(value_name = "ID")]
    pub id: String,

    /// Field update as NAME=VALUE; repeat for each field.
    #[arg(long = "field", value_name = "NAME=VALUE", value_parser = parse_field, required = true)]
    pub fields: Vec<(String, String)>,
}

#[derive(Parser)]
pub struct DeleteArgs {
    /// Record id (hex, as printed by list).
    #[arg(value_name = "ID")]
    pub id: String,

    /// Remove permanently instead of moving to the deleted ledger.
    #[arg(long = "permanent")]
    pub permanent: bool,
}

#[derive(Parser)]
pub struct RestoreArgs {
    /// Record id to restore.
    #[arg(value_name = "ID", required_unless_present = "all", conflicts_with = "all")]
    pub id: Option<String>,

    /// Restore every soft-deleted record.
    #[arg(long = "all")]
    pub all: bool,
}

#[derive(Parser)]
pub struct PurgeArgs {
    /// Record id to purge (searched in both stores).
    #[arg(value_name = "ID", required_unless_present = "all", conflicts_with = "all")]
    pub id: Option<String>,

    /// Purge every soft-deleted record.
    #[arg(long = "all")]
    pub all: bool,
}

/// Parse a `NAME=VALUE` argument.
fn parse_field(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected NAME=VALUE, got {raw:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_field_splits_on_first_equals() {
        assert_eq!(
            parse_field("comments=home=away").unwrap(),
            ("comments".to_string(), "home=away".to_string())
        );
    }

    #[test]
    fn parse_field_rejects_missing_name() {
        assert!(parse_field("=value").is_err());
        assert!(parse_field("no-equals-here").is_err());
    }

    #[test]
    fn cli_parses_a_filtered_list() {
        let cli = Cli::try_parse_from([
            "intake-desk",
            "list",
            "--equals",
            "programme=Arts",
            "--contains",
            "school=river",
            "--from",
            "2025-01-01",
        ])
        .unwrap();

        match cli.command {
            Command::List(args) => {
                assert_eq!(args.equals.len(), 1);
                assert_eq!(args.contains.len(), 1);
                assert!(args.from.is_some());
                assert!(args.to.is_none());
            }
            _ => panic!("expected list command"),
        }
    }

    #[test]
    fn restore_requires_id_or_all() {
        assert!(Cli::try_parse_from(["intake-desk", "restore"]).is_err());
        assert!(Cli::try_parse_from(["intake-desk", "restore", "--all"]).is_ok());
        assert!(Cli::try_parse_from(["intake-desk", "restore", "abcd"]).is_ok());
    }
}
