use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::model::workspace::{Workspace, WorkspaceConfig};

pub const ROSTER_DIR: &str = "roster";
pub const CONFIG_FILE: &str = "workspace.toml";

/// Error type for workspace I/O operations
#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error("not a roster workspace: no roster/workspace.toml found")]
    NotAWorkspace,
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse workspace.toml: {0}")]
    ConfigParseError(#[from] toml::de::Error),
    #[error("could not edit workspace.toml: {0}")]
    ConfigEditError(#[from] toml_edit::TomlError),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Walk up from `start` looking for a `roster/workspace.toml`.
pub fn discover_workspace(start: &Path) -> Result<PathBuf, WorkspaceError> {
    let mut current = start.to_path_buf();
    loop {
        let roster_dir = current.join(ROSTER_DIR);
        if roster_dir.is_dir() && roster_dir.join(CONFIG_FILE).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(WorkspaceError::NotAWorkspace);
        }
    }
}

/// Read and parse a workspace.toml at an explicit path.
pub fn read_config(config_path: &Path) -> Result<WorkspaceConfig, WorkspaceError> {
    let text = fs::read_to_string(config_path).map_err(|e| WorkspaceError::ReadError {
        path: config_path.to_path_buf(),
        source: e,
    })?;
    Ok(toml::from_str(&text)?)
}

/// Load the workspace rooted at `root`.
pub fn load_workspace(root: &Path) -> Result<Workspace, WorkspaceError> {
    let roster_dir = root.join(ROSTER_DIR);
    let config_path = roster_dir.join(CONFIG_FILE);
    if !config_path.exists() {
        return Err(WorkspaceError::NotAWorkspace);
    }
    let config = read_config(&config_path)?;
    tracing::debug!(
        workspace = %config.workspace.slug,
        members = config.members.len(),
        fields = config.fields.len(),
        "loaded workspace"
    );
    Ok(Workspace {
        roster_dir,
        config,
    })
}

/// Resolve an optional `-C` directory (or the cwd) to a loaded workspace.
pub fn open_workspace(dir: Option<&str>) -> Result<Workspace, WorkspaceError> {
    let start = match dir {
        Some(d) => fs::canonicalize(d).map_err(|e| WorkspaceError::ReadError {
            path: PathBuf::from(d),
            source: e,
        })?,
        None => std::env::current_dir()?,
    };
    let root = discover_workspace(&start)?;
    load_workspace(&root)
}

/// Write `content` to `path` via a temp file in the same directory.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
