//! Command implementations.

use std::fs;

use anyhow::{Context, Result, bail};
use tracing::info;

use intake_auth::{CredentialStore, Session};
use intake_model::{FieldName, Filter, Predicate, RecordDraft, RecordId};
use intake_store::{Desk, NewAttachment};

use crate::cli::{
    Cli, DeleteArgs, ListArgs, LoginArgs, PurgeArgs, RestoreArgs, ShowArgs, SubmitArgs, UpdateArgs,
};
use crate::summary;

/// Credential file name under the data dir, kept from the legacy layout.
const USERS_FILE: &str = "users.json";

/// What a command needs from the caller's role.
enum Access {
    /// Any authenticated account.
    Submit,
    /// Facilitator or admin.
    Review,
    /// Admin only.
    Manage,
}

pub fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        crate::cli::Command::Init => run_init(cli),
        crate::cli::Command::Login(args) => run_login(cli, args),
        crate::cli::Command::Submit(args) => run_submit(cli, args),
        crate::cli::Command::List(args) => run_list(cli, args),
        crate::cli::Command::Show(args) => run_show(cli, args),
        crate::cli::Command::Update(args) => run_update(cli, args),
        crate::cli::Command::Delete(args) => run_delete(cli, args),
        crate::cli::Command::Deleted => run_deleted(cli),
        crate::cli::Command::Restore(args) => run_restore(cli, args),
        crate::cli::Command::Purge(args) => run_purge(cli, args),
        crate::cli::Command::Backup => run_backup(cli),
        crate::cli::Command::Summary => run_summary(cli),
    }
}

fn credential_store(cli: &Cli) -> CredentialStore {
    CredentialStore::new(cli.data_dir.join(USERS_FILE))
}

fn open_desk(cli: &Cli) -> Result<Desk> {
    Desk::open(&cli.data_dir, cli.profile.to_profile())
        .with_context(|| format!("open data directory {}", cli.data_dir.display()))
}

/// Verify credentials and gate on the role's capabilities. Every command
/// except `init` and `login` goes through here.
fn authorize(cli: &Cli, access: Access) -> Result<Session> {
    let username = cli
        .username
        .as_deref()
        .context("this command requires --username")?;
    let password = cli
        .password
        .as_deref()
        .context("this command requires --password")?;

    let role = credential_store(cli).verify(username, password)?;
    let session = Session::with_default_ttl(username, role);
    session.require_active()?;

    let allowed = match access {
        Access::Submit => true,
        Access::Review => role.can_review(),
        Access::Manage => role.can_manage(),
    };
    if !allowed {
        bail!("the '{role}' role is not allowed to run this command");
    }
    Ok(session)
}

fn parse_id(raw: &str) -> Result<RecordId> {
    RecordId::from_hex(raw).with_context(|| format!("parse record id {raw:?}"))
}

fn run_init(cli: &Cli) -> Result<()> {
    let desk = open_desk(cli)?;
    let created = credential_store(cli)
        .initialize_defaults(&desk.profile().default_accounts)?;

    println!("Profile: {}", desk.profile().name);
    println!("Record file: {}", desk.store().path().display());
    println!("Deleted ledger: {}", desk.ledger().path().display());
    if created {
        println!("Created credential file with default accounts.");
    } else {
        println!("Credential file already present, left unchanged.");
    }
    Ok(())
}

fn run_login(cli: &Cli, args: &LoginArgs) -> Result<()> {
    let role = credential_store(cli).verify(&args.login_username, &args.login_password)?;
    let session = Session::with_default_ttl(&args.login_username, role);
    println!("Welcome, {}!", session.username);
    println!("Role: {}", session.role);
    println!(
        "Session valid until {}",
        session.expires_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    Ok(())
}

fn run_submit(cli: &Cli, args: &SubmitArgs) -> Result<()> {
    let session = authorize(cli, Access::Submit)?;
    let desk = open_desk(cli)?;

    let mut draft = RecordDraft::new();
    for (name, value) in &args.fields {
        draft.set(FieldName::new(name.as_str())?, value.as_str());
    }
    // Record who submitted when the schema tracks it.
    if desk.profile().field("username").is_some() {
        draft.set(FieldName::new("username")?, session.username.as_str());
    }

    let attachment = match &args.attachment {
        Some(path) => {
            let bytes = fs::read(path)
                .with_context(|| format!("read attachment {}", path.display()))?;
            let extension = path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("bin")
                .to_string();
            Some(NewAttachment { extension, bytes })
        }
        None => None,
    };

    let record = match desk.submit(&draft, attachment.as_ref()) {
        Ok(record) => record,
        Err(error) => bail!("{}", error.user_message()),
    };
    info!(id = %record.id, "submission accepted");
    println!("Submitted record {}", record.id);
    Ok(())
}

fn run_list(cli: &Cli, args: &ListArgs) -> Result<()> {
    authorize(cli, Access::Review)?;
    let desk = open_desk(cli)?;
    let filter = build_filter(&desk, args)?;

    let records = desk.list(&filter)?;
    summary::print_records(desk.profile(), &records);
    Ok(())
}

fn build_filter(desk: &Desk, args: &ListArgs) -> Result<Filter> {
    let known = |name: &str| -> Result<FieldName> {
        desk.profile()
            .field(name)
            .map(|def| def.name.clone())
            .with_context(|| format!("unknown field for this profile: {name}"))
    };

    let mut filter = Filter::new();
    for (name, value) in &args.equals {
        filter.push(Predicate::Equals {
            field: known(name)?,
            value: value.clone(),
        });
    }
    for (name, value) in &args.contains {
        filter.push(Predicate::Contains {
            field: known(name)?,
            value: value.clone(),
        });
    }
    if args.from.is_some() || args.to.is_some() {
        let field = match &args.date_field {
            Some(name) => known(name)?,
            None => desk.profile().timestamp_field.clone(),
        };
        filter.push(Predicate::DateRange {
            field,
            from: args.from,
            to: args.to,
        });
    }
    Ok(filter)
}

fn run_show(cli: &Cli, args: &ShowArgs) -> Result<()> {
    authorize(cli, Access::Review)?;
    let desk = open_desk(cli)?;
    let record = desk.store().get(&parse_id(&args.id)?)?;

    summary::print_record_detail(desk.profile(), &record);
    if let Some(path) = desk.attachment_path(&record) {
        if path.exists() {
            println!("Attachment: {}", path.display());
        } else {
            println!("Attachment missing on disk: {}", path.display());
        }
    }
    Ok(())
}

fn run_update(cli: &Cli, args: &UpdateArgs) -> Result<()> {
    authorize(cli, Access::Review)?;
    let desk = open_desk(cli)?;

    let updates: Vec<(FieldName, String)> = args
        .fields
        .iter()
        .map(|(name, value)| Ok((FieldName::new(name.as_str())?, value.clone())))
        .collect::<Result<_>>()?;

    let record = desk.store().update(&parse_id(&args.id)?, &updates)?;
    println!("Updated record {}", record.id);
    Ok(())
}

fn run_delete(cli: &Cli, args: &DeleteArgs) -> Result<()> {
    authorize(cli, Access::Manage)?;
    let desk = open_desk(cli)?;
    let id = parse_id(&args.id)?;

    if args.permanent {
        desk.purge(&id)?;
        println!("Permanently deleted record {id}");
    } else {
        desk.soft_delete(&id)?;
        println!("Moved record {id} to deleted entries");
    }
    Ok(())
}

fn run_deleted(cli: &Cli) -> Result<()> {
    authorize(cli, Access::Manage)?;
    let desk = open_desk(cli)?;
    let records = desk.deleted()?;
    summary::print_records(desk.profile(), &records);
    Ok(())
}

fn run_restore(cli: &Cli, args: &RestoreArgs) -> Result<()> {
    authorize(cli, Access::Manage)?;
    let desk = open_desk(cli)?;

    if args.all {
        let count = desk.restore_all()?;
        println!("Restored {count} record(s)");
        return Ok(());
    }
    let id = parse_id(args.id.as_deref().context("missing record id")?)?;
    desk.restore(&id)?;
    println!("Restored record {id}");
    Ok(())
}

fn run_purge(cli: &Cli, args: &PurgeArgs) -> Result<()> {
    authorize(cli, Access::Manage)?;
    let desk = open_desk(cli)?;

    if args.all {
        let count = desk.purge_all_deleted()?;
        println!("Permanently deleted {count} record(s)");
        return Ok(());
    }
    let id = parse_id(args.id.as_deref().context("missing record id")?)?;
    desk.purge(&id)?;
    println!("Permanently deleted record {id}");
    Ok(())
}

fn run_backup(cli: &Cli) -> Result<()> {
    authorize(cli, Access::Manage)?;
    let desk = open_desk(cli)?;
    let path = desk.backup()?;
    println!("Backup written to {}", path.display());
    Ok(())
}

fn run_summary(cli: &Cli) -> Result<()> {
    authorize(cli, Access::Review)?;
    let desk = open_desk(cli)?;
    let stats = desk.stats()?;
    summary::print_stats(&stats);
    Ok(())
}
