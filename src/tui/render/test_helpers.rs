use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;
use tempfile::TempDir;

use crate::io::fetch::{FetchError, FileMemberSource, MemberSource, project_members};
use crate::io::workspace_io::{CONFIG_FILE, ROSTER_DIR, load_workspace};
use crate::model::{Member, Workspace, WorkspaceConfig};
use crate::tui::app::App;

pub const TERM_W: u16 = 80;
pub const TERM_H: u16 = 24;

/// Render into an in-memory buffer and return plain text (no styles).
pub fn render_to_string<F>(w: u16, h: u16, f: F) -> String
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let backend = TestBackend::new(w, h);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            f(frame, area);
        })
        .unwrap();

    let buf = terminal.backend().buffer().clone();
    let w = buf.area.width as usize;
    let lines: Vec<String> = buf
        .content
        .chunks(w)
        .map(|row| {
            let s: String = row.iter().map(|cell| cell.symbol()).collect();
            s.trim_end().to_string()
        })
        .collect();

    // Trim trailing blank lines
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}

/// Render the whole app at the default terminal size.
pub fn render_app(app: &mut App) -> String {
    render_to_string(TERM_W, TERM_H, |frame, _| super::render(frame, app))
}

/// Three members on `web`, one on `api`; alice is the current user.
pub const SAMPLE_WORKSPACE: &str = r#"[workspace]
slug = "acme"
name = "Acme Corp"
current_user = "u1"

[[members]]
id = "u1"
display_name = "alice"
first_name = "Alice"
last_name = "Smith"

[[members]]
id = "u2"
display_name = "bob"
first_name = "Bob"
last_name = "Jones"

[[members]]
id = "u3"
display_name = "carol"
first_name = "Carol"
last_name = "Ali"

[[projects]]
id = "web"
name = "Web App"
members = ["u1", "u2", "u3"]

[[projects]]
id = "api"
name = "API"
members = ["u2"]

[[fields]]
id = "assignees"
label = "Assignees"
project = "web"
multiple = true
value = ["u2"]

[[fields]]
id = "lead"
label = "Lead"
project = "web"
tab_index = 1
placeholder = "Pick a lead"

[[fields]]
id = "reviewer"
label = "Reviewer"
project = "api"
disabled = true
value = "u2"
"#;

/// A field pointing at a project that does not exist.
pub const BROKEN_PROJECT_WORKSPACE: &str = r#"[workspace]
slug = "acme"

[[fields]]
id = "owner"
label = "Owner"
project = "ghost"
"#;

/// Serves members from a config held in memory.
pub struct StaticSource {
    config: WorkspaceConfig,
}

impl MemberSource for StaticSource {
    fn fetch_project_members(&self, workspace: &str, project: &str) -> Result<Vec<Member>, FetchError> {
        project_members(&self.config, workspace, project)
    }
}

/// An App over a workspace that only exists in memory. Saves fail.
pub fn test_app(toml_text: &str) -> App {
    let config: WorkspaceConfig = toml::from_str(toml_text).unwrap();
    let workspace = Workspace {
        roster_dir: PathBuf::from("/nonexistent/roster-test/roster"),
        config: config.clone(),
    };
    App::new(workspace, Arc::new(StaticSource { config }))
}

/// An App over a real workspace directory, reading members from disk.
pub fn test_app_on_disk(toml_text: &str) -> (TempDir, App) {
    let tmp = TempDir::new().unwrap();
    let roster_dir = tmp.path().join(ROSTER_DIR);
    std::fs::create_dir_all(&roster_dir).unwrap();
    std::fs::write(roster_dir.join(CONFIG_FILE), toml_text).unwrap();
    let workspace = load_workspace(tmp.path()).unwrap();
    let source = FileMemberSource::new(workspace.config_path());
    let app = App::new(workspace, Arc::new(source));
    (tmp, app)
}

/// Apply fetches until none of the app's scopes are in flight.
pub fn wait_for_fetches(app: &mut App) {
    for _ in 0..500 {
        app.poll_fetches();
        let pending = app
            .fields
            .iter()
            .any(|f| app.store.is_fetching(f.picker.scope()));
        if !pending {
            return;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    panic!("fetches did not finish");
}

/// Load every field's member list synchronously.
pub fn load_all(app: &mut App) {
    let scopes: Vec<_> = app.fields.iter().map(|f| f.picker.scope().clone()).collect();
    for scope in scopes {
        if let Some(generation) = app.store.begin_fetch(&scope) {
            let outcome = app.fetcher.fetch_now(scope, generation);
            app.store.complete_fetch(outcome);
        }
    }
}
