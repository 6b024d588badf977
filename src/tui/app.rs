use std::io;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::io::config_io::save_field_value;
use crate::io::fetch::{FileMemberSource, Fetcher, MemberSource, StoreLoader};
use crate::io::logging;
use crate::io::watcher::{FileEvent, WorkspaceWatcher};
use crate::io::workspace_io::{open_workspace, read_config};
use crate::model::{FieldConfig, ScopeKey, Workspace, WorkspaceConfig};
use crate::ops::member_store::{Applied, MemberStore};
use crate::picker::{MemberContent, OptionEntry, Picker, PickerProps, Response, Selection, Transition};

use super::input;
use super::render;
use super::theme::Theme;

/// One picker field on the form
#[derive(Debug, Clone)]
pub struct Field {
    pub config: FieldConfig,
    pub picker: Picker<ScopeKey>,
    /// The field's current value; the picker only ever reads it
    pub value: Selection<String>,
}

impl Field {
    pub fn from_config(config: &WorkspaceConfig, field: &FieldConfig) -> Self {
        let props = PickerProps {
            multiple: field.multiple,
            disabled: field.disabled,
            placeholder: field.placeholder_or_default().to_string(),
            placement: field.placement.unwrap_or(config.picker.placement),
            tab_index: field.tab_index,
            button_variant: field.button_variant.unwrap_or(config.picker.button_variant),
            dropdown_arrow: config.picker.dropdown_arrow,
            reset_query_on_close: config.picker.reset_query_on_close,
        };
        Field {
            config: field.clone(),
            picker: Picker::new(config.scope_for(&field.project), props),
            value: field.selection(),
        }
    }
}

pub type MemberOption = OptionEntry<String, MemberContent>;

/// Main application state
pub struct App {
    pub workspace: Workspace,
    pub fields: Vec<Field>,
    pub focus: Option<usize>,
    /// The field whose picker is open. Only this picker receives pointer
    /// dismissal and keyboard routing; it is cleared on every close.
    pub open_field: Option<usize>,
    pub store: MemberStore,
    pub fetcher: Fetcher,
    pub theme: Theme,
    pub should_quit: bool,
    pub status_message: Option<StatusMessage>,
    /// Modification time of our own last write, so the watcher can skip it
    last_write: Option<SystemTime>,
}

/// One line for the left of the status row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        StatusMessage {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        StatusMessage {
            text: text.into(),
            is_error: true,
        }
    }
}

fn build_fields(config: &WorkspaceConfig) -> Vec<Field> {
    config
        .fields
        .iter()
        .map(|f| Field::from_config(config, f))
        .collect()
}

impl App {
    pub fn new(workspace: Workspace, source: Arc<dyn MemberSource>) -> Self {
        let fields = build_fields(&workspace.config);
        let theme = Theme::from_config(&workspace.config.ui);
        let mut app = App {
            workspace,
            fields,
            focus: None,
            open_field: None,
            store: MemberStore::new(),
            fetcher: Fetcher::new(source),
            theme,
            should_quit: false,
            status_message: None,
            last_write: None,
        };
        if let Some(&first) = app.focus_order().first() {
            app.set_focus(first);
        }
        app
    }

    pub fn current_user(&self) -> Option<&str> {
        self.workspace.config.workspace.current_user.as_deref()
    }

    /// Focusable fields: explicit tab indexes first (ascending), then the
    /// rest in declaration order.
    pub fn focus_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = self
            .fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.picker.is_focusable())
            .map(|(i, _)| i)
            .collect();
        order.sort_by_key(|&i| {
            let tab = self.fields[i].picker.props().tab_index;
            (tab.is_none(), tab.unwrap_or(0), i)
        });
        order
    }

    pub fn set_focus(&mut self, index: usize) {
        if !self.fields.get(index).is_some_and(|f| f.picker.is_focusable()) {
            return;
        }
        for (i, field) in self.fields.iter_mut().enumerate() {
            field.picker.set_focused(i == index);
        }
        self.focus = Some(index);
    }

    fn step_focus(&mut self, forward: bool) {
        let order = self.focus_order();
        if order.is_empty() {
            return;
        }
        let pos = self.focus.and_then(|f| order.iter().position(|&i| i == f));
        let next = match (pos, forward) {
            (None, _) => 0,
            (Some(p), true) => (p + 1) % order.len(),
            (Some(p), false) => (p + order.len() - 1) % order.len(),
        };
        self.set_focus(order[next]);
    }

    pub fn focus_next(&mut self) {
        self.step_focus(true);
    }

    pub fn focus_prev(&mut self) {
        self.step_focus(false);
    }

    /// Option index for a field, derived from the store as it is right now.
    pub fn options_for(&self, index: usize) -> Option<Vec<MemberOption>> {
        let field = self.fields.get(index)?;
        self.store.member_options(field.picker.scope(), self.current_user())
    }

    /// Best label for a member id outside the picker panel: store details,
    /// then the workspace directory, then the id.
    pub fn member_label(&self, id: &str) -> String {
        if self.current_user() == Some(id) {
            return "You".to_string();
        }
        self.store
            .member(id)
            .or_else(|| self.workspace.config.member(id))
            .map(|m| m.label())
            .unwrap_or_else(|| id.to_string())
    }

    pub fn member_avatar(&self, id: &str) -> String {
        self.store
            .member(id)
            .or_else(|| self.workspace.config.member(id))
            .map(|m| m.avatar_glyph())
            .unwrap_or_else(|| "?".to_string())
    }

    /// Run one picker interaction against the field's current options and
    /// value, then apply whatever it reports.
    pub fn with_picker<F>(&mut self, index: usize, f: F) -> Response<String>
    where
        F: FnOnce(
            &mut Picker<ScopeKey>,
            Option<&[MemberOption]>,
            &Selection<String>,
            &mut StoreLoader<'_>,
        ) -> Response<String>,
    {
        if index >= self.fields.len() {
            return Response::ignored();
        }
        let options = self.options_for(index);
        let field = &mut self.fields[index];
        let mut loader = StoreLoader {
            store: &mut self.store,
            fetcher: &self.fetcher,
        };
        let response = f(&mut field.picker, options.as_deref(), &field.value, &mut loader);
        self.apply_response(index, &response);
        response
    }

    fn apply_response(&mut self, index: usize, response: &Response<String>) {
        match response.transition {
            Some(Transition::Opened { fetch_issued }) => {
                if let Some(other) = self.open_field
                    && other != index
                {
                    self.close_field(other);
                }
                self.open_field = Some(index);
                self.set_focus(index);
                tracing::debug!(field = %self.fields[index].config.id, fetch_issued, "picker opened");
            }
            Some(Transition::Closed) => {
                if self.open_field == Some(index) {
                    self.open_field = None;
                }
                tracing::debug!(field = %self.fields[index].config.id, "picker closed");
            }
            None => {}
        }

        if let Some(value) = &response.changed {
            self.fields[index].value = value.clone();
            self.save_field(index);
        }
    }

    pub fn open_field_at(&mut self, index: usize) -> Response<String> {
        self.with_picker(index, |picker, _, _, loader| Response {
            consumed: true,
            changed: None,
            transition: picker.open(loader),
        })
    }

    pub fn close_field(&mut self, index: usize) {
        if let Some(field) = self.fields.get_mut(index)
            && field.picker.close().is_some()
            && self.open_field == Some(index)
        {
            self.open_field = None;
        }
    }

    fn save_field(&mut self, index: usize) {
        let field = &self.fields[index];
        let roster_dir = self.workspace.roster_dir.clone();
        match save_field_value(&roster_dir, &field.config.id, &field.value) {
            Ok(true) => {
                self.last_write = std::fs::metadata(self.workspace.config_path())
                    .and_then(|m| m.modified())
                    .ok();
                self.status_message = None;
            }
            Ok(false) => {
                self.status_message = Some(StatusMessage::error(format!("field '{}' not found in workspace.toml", field.config.id)));
            }
            Err(e) => {
                tracing::error!(field = %field.config.id, error = %e, "could not save field");
                self.status_message = Some(StatusMessage::error(format!("could not save: {}", e)));
            }
        }
    }

    /// Apply finished fetches. Returns true if anything changed.
    pub fn poll_fetches(&mut self) -> bool {
        let outcomes = self.fetcher.poll();
        let any = !outcomes.is_empty();
        for outcome in outcomes {
            let scope = outcome.scope.clone();
            match self.store.complete_fetch(outcome) {
                Applied::Stored { count } => {
                    tracing::info!(scope = %scope, count, "members loaded");
                }
                Applied::Failed { message } => {
                    tracing::warn!(scope = %scope, error = %message, "member fetch failed");
                    self.status_message = Some(StatusMessage::error(format!("could not load members for {}: {}", scope, message)));
                }
                Applied::Discarded => {
                    tracing::debug!(scope = %scope, "discarded stale member fetch");
                }
            }
        }
        any
    }

    /// Drop the focused field's member list so the next open fetches again.
    pub fn refresh_focused(&mut self) {
        if let Some(i) = self.focus {
            let scope = self.fields[i].picker.scope().clone();
            self.store.invalidate(&scope);
            tracing::info!(scope = %scope, "member list invalidated");
            self.status_message = Some(StatusMessage::info(format!("members for {} will reload", scope)));
        }
    }

    /// React to workspace.toml changing on disk.
    pub fn handle_file_events(&mut self, events: Vec<FileEvent>) {
        let Some(FileEvent::ConfigChanged(path)) = events.into_iter().last() else {
            return;
        };
        let modified = std::fs::metadata(&path).and_then(|m| m.modified()).ok();
        if modified.is_some() && modified == self.last_write {
            return;
        }
        self.reload_workspace();
    }

    /// Re-read workspace.toml, rebuild the fields and forget every member list.
    pub fn reload_workspace(&mut self) {
        match read_config(&self.workspace.config_path()) {
            Ok(config) => {
                if let Some(i) = self.open_field.take() {
                    self.fields[i].picker.close();
                }
                self.fields = build_fields(&config);
                self.theme = Theme::from_config(&config.ui);
                self.workspace.config = config;
                self.store.invalidate_all();
                let focus = self.focus.unwrap_or(0);
                self.focus = None;
                if focus < self.fields.len() && self.fields[focus].picker.is_focusable() {
                    self.set_focus(focus);
                } else if let Some(&first) = self.focus_order().first() {
                    self.set_focus(first);
                }
                tracing::info!("workspace reloaded");
                self.status_message = Some(StatusMessage::info("workspace.toml changed, reloaded"));
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not reload workspace");
                self.status_message = Some(StatusMessage::error(format!("could not reload workspace: {}", e)));
            }
        }
    }
}

/// Run the TUI application
pub fn run(workspace_dir: Option<&str>, verbosity: u8) -> Result<(), Box<dyn std::error::Error>> {
    let workspace = open_workspace(workspace_dir)?;
    logging::init_file(&workspace.roster_dir, verbosity);

    let latency = Duration::from_millis(workspace.config.picker.fetch_latency_ms);
    let source = FileMemberSource::new(workspace.config_path()).with_latency(latency);
    let watcher = WorkspaceWatcher::start(&workspace.roster_dir)
        .map_err(|e| tracing::warn!(error = %e, "file watching disabled"))
        .ok();
    let mut app = App::new(workspace, Arc::new(source));
    tracing::info!(workspace = %app.workspace.config.workspace.slug, "tui started");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Restore the terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app, watcher.as_ref());

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    tracing::info!("tui exited");
    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    watcher: Option<&WorkspaceWatcher>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => input::handle_key(app, key),
                Event::Mouse(mouse) => input::handle_mouse(app, mouse),
                // Resize: the next draw recomputes every placement
                _ => {}
            }
        }

        app.poll_fetches();
        if let Some(w) = watcher {
            let events = w.poll();
            if !events.is_empty() {
                app.handle_file_events(events);
            }
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
