use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::app::App;

/// Form-level keys while no picker has the keyboard. Returns true when the
/// key was handled here.
pub(super) fn handle_navigate(app: &mut App, key: KeyEvent) -> bool {
    if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
        return false;
    }
    match key.code {
        KeyCode::Tab | KeyCode::Char('j') => app.focus_next(),
        KeyCode::BackTab | KeyCode::Char('k') => app.focus_prev(),
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('r') => app.refresh_focused(),
        KeyCode::Esc => app.status_message = None,
        _ => return false,
    }
    true
}
