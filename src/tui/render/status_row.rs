use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::App;
use crate::util::unicode;

const HINTS_CLOSED: &str = "Tab next  Enter open  r refresh  q quit";
const HINTS_OPEN: &str = "\u{2191}\u{2193} move  Enter select  Esc close";

/// Left side of the status row: the last message, else the fetch state of
/// the open (or focused) field.
fn status_text(app: &App) -> Option<(String, bool)> {
    if let Some(msg) = &app.status_message {
        return Some((msg.text.clone(), msg.is_error));
    }
    let index = app.open_field.or(app.focus)?;
    let scope = app.fields.get(index)?.picker.scope();
    if app.store.is_fetching(scope) {
        return Some((format!("Loading members for {}...", scope), false));
    }
    if let Some(err) = app.store.last_error(scope) {
        return Some((format!("{}: {}", scope, err), true));
    }
    let count = app.store.project_member_ids(scope)?.len();
    let when = app
        .store
        .fetched_at(scope)
        .map(|t| format!(", fetched {}", t.format("%H:%M:%S")))
        .unwrap_or_default();
    Some((format!("{} members in {}{}", count, scope, when), false))
}

/// Render the status row (bottom of screen)
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;

    let mut spans = Vec::new();
    if let Some((text, is_error)) = status_text(app) {
        let fg = if is_error { app.theme.red } else { app.theme.dim };
        spans.push(Span::styled(
            format!(" {}", text),
            Style::default().fg(fg).bg(bg),
        ));
    }

    if app.workspace.config.ui.show_key_hints {
        let hint = if app.open_field.is_some() {
            HINTS_OPEN
        } else {
            HINTS_CLOSED
        };
        let content_width: usize = spans.iter().map(|s| unicode::display_width(&s.content)).sum();
        let hint_width = unicode::display_width(hint);
        if content_width + hint_width + 1 < width {
            let padding = width - content_width - hint_width - 1;
            spans.push(Span::styled(" ".repeat(padding), Style::default().bg(bg)));
            spans.push(Span::styled(hint, Style::default().fg(app.theme.dim).bg(bg)));
        }
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}
