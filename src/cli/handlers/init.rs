use std::fs;
use std::path::PathBuf;

use crate::cli::commands::InitArgs;
use crate::io::workspace_io::{CONFIG_FILE, ROSTER_DIR};
use crate::model::WorkspaceConfig;

const WORKSPACE_TOML_TEMPLATE: &str = r##"[workspace]
slug = "{slug}"
name = ""
# Member id shown as "You" in pickers
# current_user = "u1"

# --- Members ---
# Every field is optional except id.
#
# [[members]]
# id = "u1"
# display_name = "alice"
# first_name = "Alice"
# last_name = "Smith"
# email = "alice@example.com"

# --- Projects ---
# A project's members are the options offered by its pickers.
#
# [[projects]]
# id = "web"
# name = "Web App"
# members = ["u1"]

# --- Fields ---
# One picker per field. Values are written back here when they change.
#
# [[fields]]
# id = "assignees"
# label = "Assignees"
# project = "web"
# multiple = true
# placeholder = "Members"
# placement = "bottom-start"
# button_variant = "border-with-text"

[picker]
placement = "bottom-start"
edge_padding = 1
max_visible = 8
reset_query_on_close = true
button_variant = "border-with-text"
dropdown_arrow = true

[ui]
show_key_hints = true
#
# [ui.colors]
# background = "#0C001B"
# text = "#B0AAFF"
# text_bright = "#FFFFFF"
# highlight = "#FB4196"
# dim = "#7D78BF"
"##;

/// Infer a workspace name from a directory name: replace hyphens with spaces, title-case.
fn infer_name(dir_name: &str) -> String {
    dir_name
        .split(['-', '_'])
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(c) => {
                    let upper: String = c.to_uppercase().collect();
                    upper + &chars.collect::<String>()
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lowercase, with runs of anything but letters and digits turned into one hyphen.
fn slugify(name: &str) -> String {
    let mut slug = String::new();
    for c in name.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-').to_string();
    if slug.is_empty() {
        "workspace".to_string()
    } else {
        slug
    }
}

/// The starter workspace.toml. The name goes in through toml_edit so any
/// text the user passes comes out as a valid string.
fn render_workspace_toml(name: &str) -> Result<String, toml_edit::TomlError> {
    let mut doc: toml_edit::DocumentMut = WORKSPACE_TOML_TEMPLATE.replace("{slug}", &slugify(name)).parse()?;
    doc["workspace"]["name"] = toml_edit::value(name);
    Ok(doc.to_string())
}

pub fn cmd_init(args: InitArgs, workspace_dir: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let root = match workspace_dir {
        Some(dir) => PathBuf::from(dir),
        None => std::env::current_dir()?,
    };
    let roster_dir = root.join(ROSTER_DIR);
    let config_path = roster_dir.join(CONFIG_FILE);

    if config_path.exists() && !args.force {
        return Err("roster workspace already exists in ./roster/ (use --force to overwrite)".into());
    }

    let name = args.name.unwrap_or_else(|| {
        fs::canonicalize(&root)
            .ok()
            .and_then(|p| p.file_name().and_then(|n| n.to_str()).map(infer_name))
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "Untitled".to_string())
    });

    let text = render_workspace_toml(&name)?;
    // Nothing is written unless it loads
    let config: WorkspaceConfig = toml::from_str(&text)?;
    fs::create_dir_all(&roster_dir)?;
    fs::write(&config_path, text)?;
    tracing::info!(path = %config_path.display(), slug = %config.workspace.slug, "initialized workspace");

    println!("Initialized roster workspace: {} ({})", name, config.workspace.slug);
    Ok(())
}
