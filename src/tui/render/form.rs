use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::picker::PickerLayout;
use crate::tui::app::App;
use crate::util::unicode;

use super::trigger::{TriggerState, render_trigger, trigger_line};

/// Width of the label column
pub const LABEL_W: usize = 14;
/// Widest a trigger grows
pub const TRIGGER_W: u16 = 36;
/// Focus marker and label column, plus one space
const TRIGGER_X: u16 = 2 + LABEL_W as u16 + 1;

/// Screen row of field `index` inside the form area (one blank row between fields).
pub fn field_row(area: Rect, index: usize) -> Option<u16> {
    let offset = 1 + 2 * index as u32;
    if offset >= area.height as u32 {
        return None;
    }
    Some(area.y + offset as u16)
}

/// Render every field and record each trigger's rect for hit-testing.
pub fn render_form(frame: &mut Frame, app: &mut App, area: Rect) {
    let bg = app.theme.background;

    if app.fields.is_empty() {
        let line = Line::from(Span::styled(
            "  No fields configured. Add [[fields]] to roster/workspace.toml.",
            Style::default().fg(app.theme.dim).bg(bg),
        ));
        let row = Rect::new(area.x, area.y + 1u16.min(area.height.saturating_sub(1)), area.width, 1);
        frame.render_widget(Paragraph::new(line).style(Style::default().bg(bg)), row);
        return;
    }

    for index in 0..app.fields.len() {
        let Some(y) = field_row(area, index) else {
            // Off screen: nothing to hit
            app.fields[index].picker.set_layout(PickerLayout::default());
            continue;
        };

        let field = &app.fields[index];
        let picker = &field.picker;
        let props = picker.props();
        let state = TriggerState {
            focused: picker.is_focused(),
            open: picker.is_open(),
            disabled: props.disabled,
        };

        // Label column
        let marker = if state.focused { "\u{25B8} " } else { "  " };
        let label_style = if props.disabled {
            Style::default().fg(app.theme.dim).bg(bg)
        } else if state.focused {
            Style::default()
                .fg(app.theme.text_bright)
                .bg(bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.text).bg(bg)
        };
        let label_line = Line::from(vec![
            Span::styled(marker, Style::default().fg(app.theme.highlight).bg(bg)),
            Span::styled(unicode::fit_to_width(&field.config.label, LABEL_W), label_style),
        ]);
        let label_w = TRIGGER_X.min(area.width);
        frame.render_widget(
            Paragraph::new(label_line).style(Style::default().bg(bg)),
            Rect::new(area.x, y, label_w, 1),
        );

        // Trigger
        let trigger_x = area.x + label_w;
        let trigger_w = TRIGGER_W.min(area.right().saturating_sub(trigger_x).saturating_sub(1));
        if trigger_w == 0 {
            app.fields[index].picker.set_layout(PickerLayout::default());
            continue;
        }
        let trigger = Rect::new(trigger_x, y, trigger_w, 1);

        let ids = field.value.ids();
        let labels: Vec<String> = ids.iter().map(|id| app.member_label(id)).collect();
        let avatars: Vec<String> = ids.iter().map(|id| app.member_avatar(id)).collect();
        let line = trigger_line(&app.theme, props, state, &labels, &avatars, trigger_w as usize);
        render_trigger(frame, trigger, line, &app.theme);

        let previous = app.fields[index].picker.layout();
        app.fields[index].picker.set_layout(PickerLayout {
            trigger: Some(trigger),
            ..previous
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::render::test_helpers::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn field_rows_skip_a_line() {
        let area = Rect::new(0, 2, 80, 6);
        assert_eq!(field_row(area, 0), Some(3));
        assert_eq!(field_row(area, 1), Some(5));
        assert_eq!(field_row(area, 2), Some(7));
        assert_eq!(field_row(area, 3), None);
    }

    #[test]
    fn form_lists_fields_with_values() {
        let mut app = test_app(SAMPLE_WORKSPACE);
        let output = render_to_string(TERM_W, 8, |frame, area| {
            render_form(frame, &mut app, area);
        });
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[1], "  Assignees      [ bob                            \u{25BE} ]");
        assert_eq!(lines[3], "\u{25B8} Lead           [ Pick a lead                    \u{25BE} ]");
        // Disabled: no arrow
        assert_eq!(lines[5], "  Reviewer       [ bob                              ]");
    }

    #[test]
    fn trigger_rects_are_recorded() {
        let mut app = test_app(SAMPLE_WORKSPACE);
        render_to_string(TERM_W, 8, |frame, area| {
            render_form(frame, &mut app, area);
        });
        assert_eq!(app.fields[0].picker.layout().trigger, Some(Rect::new(17, 1, 36, 1)));
        assert_eq!(app.fields[2].picker.layout().trigger, Some(Rect::new(17, 5, 36, 1)));
    }

    #[test]
    fn current_user_shows_as_you() {
        let mut app = test_app(SAMPLE_WORKSPACE);
        app.fields[0].value = crate::picker::Selection::Multiple(vec!["u1".into(), "u3".into()]);
        let output = render_to_string(TERM_W, 4, |frame, area| {
            render_form(frame, &mut app, area);
        });
        assert!(output.lines().nth(1).unwrap().contains("You, carol"));
    }
}
