use ratatui::Frame;
use ratatui::layout::{Rect, Size};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::picker::{Filtered, PickerLayout, compute_panel_rect, filter};
use crate::tui::app::App;
use crate::util::unicode;

use super::{push_highlighted_spans, query_regex};

/// Borders, search line and the rule under it
const CHROME_H: u16 = 4;
const PREFIX_W: usize = 3;
const AVATAR_W: usize = 2;
const CHECK_W: usize = 2;

/// First visible row so the highlight stays on screen, moving the window as
/// little as possible from where it was last frame.
pub fn scroll_offset(previous: usize, highlighted: usize, visible: usize, len: usize) -> usize {
    if visible == 0 {
        return 0;
    }
    let mut first = previous.min(len.saturating_sub(visible));
    if highlighted < first {
        first = highlighted;
    } else if highlighted >= first + visible {
        first = highlighted + 1 - visible;
    }
    first
}

/// Panel size for `rows` option rows plus the search line, rule and border.
fn panel_size(width: u16, rows: usize) -> Size {
    let rows = u16::try_from(rows).unwrap_or(u16::MAX);
    Size::new(width, rows.saturating_add(CHROME_H))
}

/// Render the open picker's panel next to its trigger and record where it went.
pub fn render_panel(frame: &mut Frame, app: &mut App) {
    let Some(index) = app.open_field else {
        return;
    };
    let options = app.options_for(index);
    let field = &app.fields[index];
    let picker = &field.picker;
    let cfg = &app.workspace.config.picker;
    let filtered = filter(options.as_deref(), picker.query());

    let rows = match &filtered {
        Filtered::Loading => 1,
        Filtered::Ready(entries) => entries.len().clamp(1, cfg.max_visible.max(1)),
    };
    let size = panel_size(cfg.panel_width, rows);

    // Keep the status row visible
    let full = frame.area();
    let viewport = Rect::new(full.x, full.y, full.width, full.height.saturating_sub(1));
    let layout = picker.layout();
    let Some(rect) = compute_panel_rect(layout.trigger, Some(size), viewport, picker.props().placement, cfg.edge_padding)
    else {
        app.fields[index].picker.set_layout(PickerLayout {
            panel: None,
            list: None,
            ..layout
        });
        return;
    };

    let bg = app.theme.background;
    let dim = app.theme.dim;
    let bg_style = Style::default().bg(bg);

    frame.render_widget(Clear, rect);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border).bg(bg))
        .style(bg_style);
    let inner = block.inner(rect);
    frame.render_widget(block, rect);

    let mut list = None;
    let mut first_visible = 0;

    if inner.height >= 3 {
        let width = inner.width as usize;

        // Search line: /query▌
        let mut search = vec![
            Span::styled("/", Style::default().fg(dim).bg(bg)),
            Span::styled(picker.query().to_string(), Style::default().fg(app.theme.text_bright).bg(bg)),
            Span::styled("\u{258C}", Style::default().fg(app.theme.highlight).bg(bg)),
        ];
        if picker.query().is_empty() {
            search.push(Span::styled("Search members", Style::default().fg(dim).bg(bg)));
        }
        let rule = Span::styled("\u{2500}".repeat(width), Style::default().fg(dim).bg(bg));
        frame.render_widget(
            Paragraph::new(vec![Line::from(search), Line::from(rule)]).style(bg_style),
            Rect::new(inner.x, inner.y, inner.width, 2),
        );

        let list_area = Rect::new(inner.x, inner.y + 2, inner.width, inner.height - 2);
        let mut lines: Vec<Line> = Vec::new();

        match &filtered {
            Filtered::Loading => {
                lines.push(Line::from(Span::styled("  Loading...", Style::default().fg(dim).bg(bg))));
            }
            Filtered::Ready(entries) if entries.is_empty() => {
                lines.push(Line::from(Span::styled(
                    "  No matching results",
                    Style::default().fg(dim).bg(bg),
                )));
            }
            Filtered::Ready(entries) => {
                let visible = list_area.height as usize;
                let highlighted = picker.highlighted(entries.len()).unwrap_or(0);
                first_visible = scroll_offset(layout.first_visible, highlighted, visible, entries.len());
                let re = query_regex(picker.query());
                let label_w = width.saturating_sub(PREFIX_W + AVATAR_W + CHECK_W);

                for (i, entry) in entries.iter().enumerate().skip(first_visible).take(visible) {
                    let is_highlighted = i == highlighted;
                    let row_bg = if is_highlighted { app.theme.selection_bg } else { bg };
                    let row_style = if is_highlighted {
                        Style::default()
                            .fg(app.theme.text_bright)
                            .bg(row_bg)
                            .add_modifier(Modifier::BOLD)
                    } else {
                        Style::default().fg(app.theme.text).bg(row_bg)
                    };
                    let match_style = Style::default()
                        .fg(app.theme.search_match_fg)
                        .bg(app.theme.search_match_bg);

                    let prefix = if is_highlighted { " \u{25B8} " } else { "   " };
                    let mut spans = vec![
                        Span::styled(prefix, row_style),
                        Span::styled(
                            unicode::fit_to_width(&entry.content.avatar, AVATAR_W),
                            Style::default().fg(app.theme.highlight).bg(row_bg),
                        ),
                    ];
                    let label = unicode::truncate_to_width(entry.content.display_label(), label_w);
                    push_highlighted_spans(&mut spans, &label, row_style, match_style, re.as_ref());
                    let used = unicode::display_width(&label);
                    if used < label_w {
                        spans.push(Span::styled(" ".repeat(label_w - used), row_style));
                    }
                    let check = if field.value.contains(&entry.value) { "\u{2713} " } else { "  " };
                    spans.push(Span::styled(check, Style::default().fg(app.theme.green).bg(row_bg)));
                    lines.push(Line::from(spans));
                }

                let shown = lines.len() as u16;
                list = Some(Rect::new(list_area.x, list_area.y, list_area.width, shown));
            }
        }

        frame.render_widget(Paragraph::new(lines).style(bg_style), list_area);
    }

    app.fields[index].picker.set_layout(PickerLayout {
        trigger: layout.trigger,
        panel: Some(rect),
        list,
        first_visible,
    });
}
