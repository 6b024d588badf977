use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::picker::{ButtonStyle, PickerProps};
use crate::tui::theme::Theme;
use crate::util::unicode;

const ARROW: &str = " \u{25BE}";

#[derive(Debug, Clone, Copy, Default)]
pub struct TriggerState {
    pub focused: bool,
    pub open: bool,
    pub disabled: bool,
}

/// Edge and body styles for one button family
struct Paint {
    edge: Style,
    body: Style,
}

/// One entry per button family: edge strings plus a paint function.
struct Skin {
    style: ButtonStyle,
    left: &'static str,
    right: &'static str,
    paint: fn(&Theme, TriggerState) -> Paint,
}

const SKINS: [Skin; 3] = [
    Skin {
        style: ButtonStyle::Border,
        left: "[ ",
        right: " ]",
        paint: paint_border,
    },
    Skin {
        style: ButtonStyle::Background,
        left: " ",
        right: " ",
        paint: paint_background,
    },
    Skin {
        style: ButtonStyle::Transparent,
        left: "",
        right: "",
        paint: paint_transparent,
    },
];

fn skin_for(style: ButtonStyle) -> &'static Skin {
    SKINS.iter().find(|s| s.style == style).unwrap_or(&SKINS[0])
}

fn paint_border(theme: &Theme, state: TriggerState) -> Paint {
    let edge_fg = if state.focused || state.open {
        theme.highlight
    } else {
        theme.border
    };
    Paint {
        edge: Style::default().fg(edge_fg).bg(theme.background),
        body: Style::default().fg(theme.text).bg(theme.background),
    }
}

fn paint_background(theme: &Theme, state: TriggerState) -> Paint {
    let bg = if state.focused || state.open {
        theme.selection_bg
    } else {
        theme.surface
    };
    let style = Style::default().fg(theme.text_bright).bg(bg);
    Paint {
        edge: style,
        body: style,
    }
}

fn paint_transparent(theme: &Theme, state: TriggerState) -> Paint {
    let mut body = Style::default().fg(theme.text).bg(theme.background);
    if state.focused || state.open {
        body = body.add_modifier(Modifier::UNDERLINED);
    }
    Paint { edge: body, body }
}

/// Text inside a trigger of `width` cells.
///
/// Labels (or avatar glyphs when text is hidden) are listed while they fit;
/// whatever does not fit is summarized as `+N`. An empty value shows the
/// placeholder.
pub fn trigger_text(
    labels: &[String],
    avatars: &[String],
    placeholder: &str,
    hide_text: bool,
    width: usize,
) -> String {
    let (items, sep) = if hide_text {
        (avatars, " ")
    } else {
        (labels, ", ")
    };
    if items.is_empty() {
        return unicode::truncate_to_width(placeholder, width);
    }

    let n = items.len();
    for shown in (1..=n).rev() {
        let mut text = items[..shown].join(sep);
        if shown < n {
            text.push_str(&format!(" +{}", n - shown));
        }
        if unicode::display_width(&text) <= width {
            return text;
        }
    }

    // Not even the first item fits whole
    if n > 1 {
        let suffix = format!(" +{}", n - 1);
        let budget = width.saturating_sub(suffix.len());
        if budget > 1 {
            return format!("{}{}", unicode::truncate_to_width(&items[0], budget), suffix);
        }
    }
    unicode::truncate_to_width(&items[0], width)
}

/// Build the trigger line, exactly `width` cells wide.
pub fn trigger_line(
    theme: &Theme,
    props: &PickerProps,
    state: TriggerState,
    labels: &[String],
    avatars: &[String],
    width: usize,
) -> Line<'static> {
    let skin = skin_for(props.button_variant.style());
    let paint = (skin.paint)(theme, state);
    let show_arrow = props.dropdown_arrow && !state.disabled;
    let arrow_w = if show_arrow { unicode::display_width(ARROW) } else { 0 };
    let chrome = unicode::display_width(skin.left) + unicode::display_width(skin.right) + arrow_w;
    let text_w = width.saturating_sub(chrome);

    let text = trigger_text(labels, avatars, &props.placeholder, props.button_variant.hide_text(), text_w);
    let body_style = if state.disabled || labels.is_empty() {
        paint.body.fg(theme.dim)
    } else {
        paint.body
    };

    let mut spans = vec![
        Span::styled(skin.left, paint.edge),
        Span::styled(unicode::fit_to_width(&text, text_w), body_style),
    ];
    if show_arrow {
        spans.push(Span::styled(ARROW, paint.body.fg(theme.dim)));
    }
    spans.push(Span::styled(skin.right, paint.edge));
    Line::from(spans)
}

pub fn render_trigger(frame: &mut Frame, area: Rect, line: Line<'static>, theme: &Theme) {
    let paragraph = Paragraph::new(line).style(Style::default().bg(theme.background));
    frame.render_widget(paragraph, area);
}
