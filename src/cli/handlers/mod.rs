mod init;
pub use init::cmd_init;

use std::sync::Arc;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io::update_field_value;
use crate::io::fetch::{FileMemberSource, Fetcher};
use crate::io::workspace_io::open_workspace;
use crate::model::{Workspace, WorkspaceConfig};
use crate::ops::field_ops::{apply_commits, editable_field, validate_members};
use crate::ops::member_store::{Applied, MemberStore};
use crate::picker::{Selection, filter};

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let json = cli.json;
    let dir = cli.workspace_dir.as_deref();

    match cli.command {
        None => Err("no command given".into()),
        Some(cmd) => match cmd {
            Commands::Init(args) => cmd_init(args, dir),
            Commands::Members(args) => cmd_members(args, dir, json),
            Commands::Fields => cmd_fields(dir, json),
            Commands::Set(args) => cmd_set(args, dir, json),
            Commands::Clear(args) => cmd_clear(args, dir, json),
        },
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Labels for a value, for plain output. `-` when empty.
fn value_labels(config: &WorkspaceConfig, value: &Selection<String>) -> String {
    if value.is_empty() {
        return "-".to_string();
    }
    value
        .ids()
        .iter()
        .map(|id| config.member(id).map(|m| m.label()).unwrap_or_else(|| id.to_string()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_field(workspace: &Workspace, field_id: &str, value: &Selection<String>, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = &workspace.config;
    let field = config
        .field(field_id)
        .ok_or_else(|| format!("unknown field '{}'", field_id))?;
    if json {
        let mut out = field_to_json(field);
        out.value = value.clone();
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{}: {}", field.id, value_labels(config, value));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_members(args: MembersArgs, dir: Option<&str>, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let workspace = open_workspace(dir)?;
    let config = &workspace.config;
    let scope = config.scope_for(&args.project);

    let fetcher = Fetcher::new(Arc::new(FileMemberSource::new(workspace.config_path())));
    let mut store = MemberStore::new();
    if let Some(generation) = store.begin_fetch(&scope) {
        let outcome = fetcher.fetch_now(scope.clone(), generation);
        if let Applied::Failed { message } = store.complete_fetch(outcome) {
            return Err(message.into());
        }
    }

    let current_user = config.workspace.current_user.as_deref();
    let options = store.member_options(&scope, current_user).unwrap_or_default();
    let query = args.query.unwrap_or_default();
    let filtered = filter(Some(&options[..]), &query);
    tracing::debug!(scope = %scope, total = options.len(), shown = filtered.len(), "filtered members");

    if json {
        let members = filtered
            .entries()
            .iter()
            .map(|entry| member_to_json(entry, store.member(&entry.value)))
            .collect();
        let out = MemberListJson {
            project: args.project,
            query: if query.is_empty() { None } else { Some(query) },
            members,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if filtered.is_empty() {
        println!("No matching results");
        return Ok(());
    }
    let id_w = filtered
        .entries()
        .iter()
        .map(|e| e.value.len())
        .max()
        .unwrap_or(0);
    for entry in filtered.entries() {
        let you = if entry.content.is_you { "  (you)" } else { "" };
        println!(
            "{:<id_w$}  {} {}{}",
            entry.value,
            entry.content.avatar,
            entry.content.label,
            you,
            id_w = id_w
        );
    }
    Ok(())
}

fn cmd_fields(dir: Option<&str>, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let workspace = open_workspace(dir)?;
    let config = &workspace.config;

    if json {
        let fields: Vec<FieldJson> = config.fields.iter().map(field_to_json).collect();
        println!("{}", serde_json::to_string_pretty(&fields)?);
        return Ok(());
    }

    if config.fields.is_empty() {
        println!("No fields configured");
        return Ok(());
    }
    let id_w = config.fields.iter().map(|f| f.id.len()).max().unwrap_or(0);
    let project_w = config.fields.iter().map(|f| f.project.len()).max().unwrap_or(0);
    for field in &config.fields {
        let mode = if field.multiple { "multi " } else { "single" };
        let disabled = if field.disabled { "  (disabled)" } else { "" };
        println!(
            "{:<id_w$}  {:<project_w$}  {}  {}{}",
            field.id,
            field.project,
            mode,
            value_labels(config, &field.selection()),
            disabled,
            id_w = id_w,
            project_w = project_w
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_set(args: SetArgs, dir: Option<&str>, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let workspace = open_workspace(dir)?;
    let config = &workspace.config;
    let field = editable_field(config, &args.field)?;
    validate_members(config, field, &args.members)?;

    let value = update_field_value(&workspace.roster_dir, &field.id, |current| {
        apply_commits(current, &args.members)
    })?
    .ok_or_else(|| format!("field '{}' not found in workspace.toml", field.id))?;
    print_field(&workspace, &field.id, &value, json)
}

fn cmd_clear(args: ClearArgs, dir: Option<&str>, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let workspace = open_workspace(dir)?;
    let field = editable_field(&workspace.config, &args.field)?;

    let multiple = field.multiple;
    let value = update_field_value(&workspace.roster_dir, &field.id, |_| Selection::empty(multiple))?
        .ok_or_else(|| format!("field '{}' not found in workspace.toml", field.id))?;
    print_field(&workspace, &field.id, &value, json)
}
