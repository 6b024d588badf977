mod mouse;
mod navigate;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent};

use super::app::App;

use navigate::handle_navigate;

/// Route a key press: the open picker first, then form navigation, then the
/// focused picker.
pub fn handle_key(app: &mut App, key: KeyEvent) {
    // Ignore bare modifier key presses (Shift, Ctrl, Alt, etc.)
    if matches!(key.code, KeyCode::Modifier(_)) {
        return;
    }
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if let Some(index) = app.open_field {
        let response = app.with_picker(index, |picker, options, value, loader| {
            picker.handle_key(key, options, value, loader)
        });
        // Unconsumed (Tab) falls through so focus moves
        if response.consumed {
            return;
        }
    }

    if handle_navigate(app, key) {
        return;
    }

    if let Some(index) = app.focus {
        app.with_picker(index, |picker, options, value, loader| {
            picker.handle_key(key, options, value, loader)
        });
    }
}

pub fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    mouse::handle_mouse(app, mouse);
}
