use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::model::member::Member;
use crate::picker::{ButtonVariant, Placement, Selection};

/// A loaded workspace: the parsed config plus where it lives on disk.
#[derive(Debug, Clone)]
pub struct Workspace {
    /// The `roster/` directory itself
    pub roster_dir: PathBuf,
    pub config: WorkspaceConfig,
}

impl Workspace {
    pub fn config_path(&self) -> PathBuf {
        self.roster_dir.join("workspace.toml")
    }
}

/// Identifies one lazily-fetched member collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeKey {
    pub workspace: String,
    pub project: String,
}

impl ScopeKey {
    pub fn new(workspace: &str, project: &str) -> Self {
        ScopeKey {
            workspace: workspace.to_string(),
            project: project.to_string(),
        }
    }
}

impl std::fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.workspace, self.project)
    }
}

/// Configuration from workspace.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    pub workspace: WorkspaceInfo,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub projects: Vec<ProjectConfig>,
    #[serde(default)]
    pub fields: Vec<FieldConfig>,
    #[serde(default)]
    pub picker: PickerConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

impl WorkspaceConfig {
    pub fn project(&self, id: &str) -> Option<&ProjectConfig> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn member(&self, id: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.id == id)
    }

    pub fn field(&self, id: &str) -> Option<&FieldConfig> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn scope_for(&self, project: &str) -> ScopeKey {
        ScopeKey::new(&self.workspace.slug, project)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceInfo {
    pub slug: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Member id rendered as "You" in pickers
    #[serde(default)]
    pub current_user: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub members: Vec<String>,
}

/// Stored value of a field: a bare id or a list of ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    One(String),
    Many(Vec<String>),
}

/// A member picker field on the properties form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldConfig {
    pub id: String,
    pub label: String,
    pub project: String,
    #[serde(default)]
    pub multiple: bool,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub placement: Option<Placement>,
    #[serde(default)]
    pub tab_index: Option<i32>,
    #[serde(default)]
    pub button_variant: Option<ButtonVariant>,
    #[serde(default)]
    pub value: Option<FieldValue>,
}

impl FieldConfig {
    /// The stored value shaped for this field's mode. A list stored on a
    /// single field keeps its first entry; a bare id on a multi field becomes
    /// a one-element list.
    pub fn selection(&self) -> Selection<String> {
        match (self.multiple, &self.value) {
            (true, None) => Selection::Multiple(Vec::new()),
            (true, Some(FieldValue::One(id))) => Selection::Multiple(vec![id.clone()]),
            (true, Some(FieldValue::Many(ids))) => Selection::Multiple(ids.clone()),
            (false, None) => Selection::Single(None),
            (false, Some(FieldValue::One(id))) => Selection::Single(Some(id.clone())),
            (false, Some(FieldValue::Many(ids))) => Selection::Single(ids.first().cloned()),
        }
    }

    pub fn placeholder_or_default(&self) -> &str {
        self.placeholder.as_deref().unwrap_or("Members")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickerConfig {
    #[serde(default)]
    pub placement: Placement,
    /// Minimum distance in cells between the panel and the viewport edge
    #[serde(default = "default_edge_padding")]
    pub edge_padding: u16,
    #[serde(default = "default_max_visible")]
    pub max_visible: usize,
    #[serde(default = "default_panel_width")]
    pub panel_width: u16,
    #[serde(default = "default_true")]
    pub reset_query_on_close: bool,
    #[serde(default)]
    pub button_variant: ButtonVariant,
    #[serde(default = "default_true")]
    pub dropdown_arrow: bool,
    /// Artificial delay applied to each member fetch
    #[serde(default)]
    pub fetch_latency_ms: u64,
}

impl Default for PickerConfig {
    fn default() -> Self {
        PickerConfig {
            placement: Placement::default(),
            edge_padding: default_edge_padding(),
            max_visible: default_max_visible(),
            panel_width: default_panel_width(),
            reset_query_on_close: true,
            button_variant: ButtonVariant::default(),
            dropdown_arrow: true,
            fetch_latency_ms: 0,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_edge_padding() -> u16 {
    1
}

fn default_max_visible() -> usize {
    8
}

fn default_panel_width() -> u16 {
    32
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_true")]
    pub show_key_hints: bool,
    #[serde(default)]
    pub colors: HashMap<String, String>,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            show_key_hints: true,
            colors: HashMap::new(),
        }
    }
}
