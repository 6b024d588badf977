use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};

use crate::tui::app::App;

/// Left button down goes to the open picker first: presses outside it
/// dismiss it and then reach the form, where they may open another trigger.
pub(super) fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
        return;
    }
    let (column, row) = (mouse.column, mouse.row);

    if let Some(index) = app.open_field {
        let response = app.with_picker(index, |picker, options, value, loader| {
            picker.handle_pointer_down(column, row, options, value, loader)
        });
        if response.consumed {
            return;
        }
    }

    for index in 0..app.fields.len() {
        let response = app.with_picker(index, |picker, options, value, loader| {
            picker.handle_pointer_down(column, row, options, value, loader)
        });
        if response.consumed {
            return;
        }
    }
}
