use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "roster", about = concat!("roster v", env!("CARGO_PKG_VERSION"), " - pick workspace members from the terminal"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different workspace directory
    #[arg(short = 'C', long = "workspace-dir", global = true)]
    pub workspace_dir: Option<String>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create roster/workspace.toml in the current directory
    Init(InitArgs),
    /// List a project's members, optionally filtered
    Members(MembersArgs),
    /// List picker fields and their values
    Fields,
    /// Select members on a field
    Set(SetArgs),
    /// Clear a field's value
    Clear(ClearArgs),
}

#[derive(Args)]
pub struct InitArgs {
    /// Workspace name (default: inferred from directory name)
    #[arg(long)]
    pub name: Option<String>,
    /// Overwrite an existing roster/workspace.toml
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct MembersArgs {
    /// Project id
    pub project: String,
    /// Case-insensitive substring to filter by
    #[arg(long, short = 'q')]
    pub query: Option<String>,
}

#[derive(Args)]
pub struct SetArgs {
    /// Field id
    pub field: String,
    /// Member ids; on multi-select fields each one toggles
    #[arg(required = true)]
    pub members: Vec<String>,
}

#[derive(Args)]
pub struct ClearArgs {
    /// Field id
    pub field: String,
}
