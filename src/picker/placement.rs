use std::fmt;
use std::str::FromStr;

use ratatui::layout::{Rect, Size};
use serde::{Deserialize, Serialize};

/// Where the options panel sits relative to its trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Placement {
    TopStart,
    TopEnd,
    #[default]
    BottomStart,
    BottomEnd,
    LeftStart,
    LeftEnd,
    RightStart,
    RightEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Start,
    End,
}

const ALL: [(Placement, &str); 8] = [
    (Placement::TopStart, "top-start"),
    (Placement::TopEnd, "top-end"),
    (Placement::BottomStart, "bottom-start"),
    (Placement::BottomEnd, "bottom-end"),
    (Placement::LeftStart, "left-start"),
    (Placement::LeftEnd, "left-end"),
    (Placement::RightStart, "right-start"),
    (Placement::RightEnd, "right-end"),
];

impl Placement {
    pub fn side(self) -> Side {
        match self {
            Placement::TopStart | Placement::TopEnd => Side::Top,
            Placement::BottomStart | Placement::BottomEnd => Side::Bottom,
            Placement::LeftStart | Placement::LeftEnd => Side::Left,
            Placement::RightStart | Placement::RightEnd => Side::Right,
        }
    }

    pub fn align(self) -> Align {
        match self {
            Placement::TopStart
            | Placement::BottomStart
            | Placement::LeftStart
            | Placement::RightStart => Align::Start,
            _ => Align::End,
        }
    }

    /// Same alignment on the opposite side
    pub fn flipped(self) -> Placement {
        match self {
            Placement::TopStart => Placement::BottomStart,
            Placement::TopEnd => Placement::BottomEnd,
            Placement::BottomStart => Placement::TopStart,
            Placement::BottomEnd => Placement::TopEnd,
            Placement::LeftStart => Placement::RightStart,
            Placement::LeftEnd => Placement::RightEnd,
            Placement::RightStart => Placement::LeftStart,
            Placement::RightEnd => Placement::LeftEnd,
        }
    }

    pub fn as_str(self) -> &'static str {
        ALL.iter()
            .find(|(p, _)| *p == self)
            .map(|(_, s)| *s)
            .unwrap_or("bottom-start")
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Placement {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL.iter()
            .find(|(_, name)| *name == s)
            .map(|(p, _)| *p)
            .ok_or_else(|| format!("unknown placement '{}'", s))
    }
}

/// Room available on `side` of the trigger inside the viewport.
fn space_on(side: Side, trigger: Rect, viewport: Rect) -> i32 {
    match side {
        Side::Top => trigger.y as i32 - viewport.y as i32,
        Side::Bottom => viewport.bottom() as i32 - trigger.bottom() as i32,
        Side::Left => trigger.x as i32 - viewport.x as i32,
        Side::Right => viewport.right() as i32 - trigger.right() as i32,
    }
}

fn clamp_axis(pos: i32, len: u16, lo: i32, hi: i32) -> i32 {
    let max = hi - len as i32;
    if max < lo { lo } else { pos.clamp(lo, max) }
}

/// Place a panel of size `panel` next to `trigger` inside `viewport`.
///
/// The preferred side flips to the opposite one when the panel does not fit
/// and the opposite side has more room. The result is then kept inside the
/// viewport: along the alignment axis it stays `padding` cells clear of the
/// edges, along the main axis it may touch the edge but never leaves it.
///
/// Returns `None` until both the trigger and the panel have been laid out.
pub fn compute_panel_rect(
    trigger: Option<Rect>,
    panel: Option<Size>,
    viewport: Rect,
    placement: Placement,
    padding: u16,
) -> Option<Rect> {
    let trigger = trigger?;
    let panel = panel?;
    if viewport.is_empty() {
        return None;
    }

    let usable_w = viewport.width.saturating_sub(padding.saturating_mul(2));
    let usable_h = viewport.height.saturating_sub(padding.saturating_mul(2));
    let vertical = matches!(placement.side(), Side::Top | Side::Bottom);

    let width = if vertical && usable_w > 0 {
        panel.width.min(usable_w)
    } else {
        panel.width.min(viewport.width)
    };
    let height = if !vertical && usable_h > 0 {
        panel.height.min(usable_h)
    } else {
        panel.height.min(viewport.height)
    };

    let needed = if vertical { height } else { width } as i32;
    let preferred = placement.side();
    let opposite = placement.flipped().side();
    let side = if space_on(preferred, trigger, viewport) < needed
        && space_on(opposite, trigger, viewport) > space_on(preferred, trigger, viewport)
    {
        opposite
    } else {
        preferred
    };

    let (tx, ty) = (trigger.x as i32, trigger.y as i32);
    let (tr, tb) = (trigger.right() as i32, trigger.bottom() as i32);
    let (w, h) = (width as i32, height as i32);

    let (x, y) = match (side, placement.align()) {
        (Side::Bottom, Align::Start) => (tx, tb),
        (Side::Bottom, Align::End) => (tr - w, tb),
        (Side::Top, Align::Start) => (tx, ty - h),
        (Side::Top, Align::End) => (tr - w, ty - h),
        (Side::Right, Align::Start) => (tr, ty),
        (Side::Right, Align::End) => (tr, tb - h),
        (Side::Left, Align::Start) => (tx - w, ty),
        (Side::Left, Align::End) => (tx - w, tb - h),
    };

    let vx = viewport.x as i32;
    let vy = viewport.y as i32;
    let vr = viewport.right() as i32;
    let vb = viewport.bottom() as i32;
    let pad = padding as i32;

    let (x, y) = if vertical {
        (
            clamp_axis(x, width, vx + pad, vr - pad),
            clamp_axis(y, height, vy, vb),
        )
    } else {
        (
            clamp_axis(x, width, vx, vr),
            clamp_axis(y, height, vy + pad, vb - pad),
        )
    };

    Some(Rect::new(x.max(0) as u16, y.max(0) as u16, width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Rect = Rect {
        x: 0,
        y: 0,
        width: 80,
        height: 24,
    };

    fn size(width: u16, height: u16) -> Option<Size> {
        Some(Size { width, height })
    }

    #[test]
    fn bottom_start_sits_under_trigger() {
        let trigger = Rect::new(10, 5, 20, 1);
        let rect = compute_panel_rect(Some(trigger), size(30, 10), VIEWPORT, Placement::BottomStart, 1);
        assert_eq!(rect, Some(Rect::new(10, 6, 30, 10)));
    }

    #[test]
    fn flips_above_when_no_room_below() {
        let trigger = Rect::new(10, 20, 20, 1);
        let rect = compute_panel_rect(Some(trigger), size(30, 10), VIEWPORT, Placement::BottomStart, 1);
        assert_eq!(rect, Some(Rect::new(10, 10, 30, 10)));
    }

    #[test]
    fn does_not_flip_when_opposite_is_worse() {
        // 3 rows below, 2 above: stays below and is clamped to the viewport
        let viewport = Rect::new(0, 0, 80, 6);
        let trigger = Rect::new(0, 2, 10, 1);
        let rect = compute_panel_rect(Some(trigger), size(20, 4), viewport, Placement::BottomStart, 1);
        assert_eq!(rect, Some(Rect::new(1, 2, 20, 4)));
    }

    #[test]
    fn clamps_to_right_edge_with_padding() {
        let trigger = Rect::new(70, 2, 5, 1);
        let rect = compute_panel_rect(Some(trigger), size(30, 5), VIEWPORT, Placement::BottomStart, 1);
        assert_eq!(rect, Some(Rect::new(49, 3, 30, 5)));
    }

    #[test]
    fn end_alignment_clamps_to_left_padding() {
        let trigger = Rect::new(10, 5, 20, 1);
        let rect = compute_panel_rect(Some(trigger), size(30, 4), VIEWPORT, Placement::BottomEnd, 1);
        assert_eq!(rect, Some(Rect::new(1, 6, 30, 4)));
    }

    #[test]
    fn right_side_placement() {
        let trigger = Rect::new(10, 5, 20, 1);
        let rect = compute_panel_rect(Some(trigger), size(20, 6), VIEWPORT, Placement::RightStart, 1);
        assert_eq!(rect, Some(Rect::new(30, 5, 20, 6)));
        let rect = compute_panel_rect(Some(trigger), size(20, 6), VIEWPORT, Placement::LeftEnd, 1);
        // Not enough room on the left (10 < 20), right has 50: flips to right, end-aligned
        assert_eq!(rect, Some(Rect::new(30, 1, 20, 6)));
    }

    #[test]
    fn oversized_panel_is_shrunk_to_viewport() {
        let trigger = Rect::new(0, 0, 10, 1);
        let rect = compute_panel_rect(Some(trigger), size(200, 5), VIEWPORT, Placement::BottomStart, 1)
            .unwrap();
        assert_eq!(rect.width, 78);
        assert_eq!(rect.x, 1);
    }

    #[test]
    fn unmounted_elements_yield_none() {
        let trigger = Rect::new(10, 5, 20, 1);
        assert_eq!(compute_panel_rect(None, size(30, 10), VIEWPORT, Placement::BottomStart, 1), None);
        assert_eq!(compute_panel_rect(Some(trigger), None, VIEWPORT, Placement::BottomStart, 1), None);
        assert_eq!(
            compute_panel_rect(Some(trigger), size(30, 10), Rect::default(), Placement::BottomStart, 1),
            None
        );
    }

    #[test]
    fn parse_and_display_round_trip() {
        for (p, name) in ALL {
            assert_eq!(name.parse::<Placement>().unwrap(), p);
            assert_eq!(p.to_string(), name);
            assert_eq!(p.flipped().flipped(), p);
        }
        assert!("middle".parse::<Placement>().is_err());
    }
}
