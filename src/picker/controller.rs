use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::{Position, Rect};

use super::filter::{Filtered, filter};
use super::options::OptionEntry;
use super::placement::Placement;
use super::selection::Selection;
use super::variant::ButtonVariant;

/// Source of the lazily loaded collection behind a picker.
pub trait DeferredLoader<K> {
    fn is_loaded(&self, key: &K) -> bool;

    /// Ask for the collection under `key`. Returns true only when a new
    /// request was issued; a key that is already in flight must not be
    /// requested again.
    fn request(&mut self, key: &K) -> bool;
}

/// Caller-controlled picker settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerProps {
    pub multiple: bool,
    pub disabled: bool,
    pub placeholder: String,
    pub placement: Placement,
    pub tab_index: Option<i32>,
    pub button_variant: ButtonVariant,
    pub dropdown_arrow: bool,
    pub reset_query_on_close: bool,
}

impl Default for PickerProps {
    fn default() -> Self {
        PickerProps {
            multiple: false,
            disabled: false,
            placeholder: "Members".to_string(),
            placement: Placement::default(),
            tab_index: None,
            button_variant: ButtonVariant::default(),
            dropdown_arrow: false,
            reset_query_on_close: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Opened { fetch_issued: bool },
    Closed,
}

/// What an interaction did. `changed` carries the new value to hand to the
/// owner of the selection; it is the picker's only way to report one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response<Id> {
    pub changed: Option<Selection<Id>>,
    pub transition: Option<Transition>,
    /// False when the event should be handled by the surrounding view
    pub consumed: bool,
}

impl<Id> Response<Id> {
    pub fn ignored() -> Self {
        Response {
            changed: None,
            transition: None,
            consumed: false,
        }
    }

    fn consumed() -> Self {
        Response {
            consumed: true,
            ..Response::ignored()
        }
    }

    fn transition(transition: Option<Transition>) -> Self {
        Response {
            consumed: transition.is_some(),
            transition,
            changed: None,
        }
    }
}

/// Screen geometry recorded by the renderer, used for pointer hit-testing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PickerLayout {
    pub trigger: Option<Rect>,
    pub panel: Option<Rect>,
    /// Rows showing options, inside the panel
    pub list: Option<Rect>,
    /// Index of the filtered option shown on the first list row
    pub first_visible: usize,
}

fn hit(rect: Option<Rect>, pos: Position) -> bool {
    rect.is_some_and(|r| r.contains(pos))
}

/// Interaction state of one searchable picker.
///
/// The picker owns only its open flag, query, highlight and last layout. The
/// options and the selected value are passed in on every call.
#[derive(Debug, Clone)]
pub struct Picker<K> {
    scope: K,
    props: PickerProps,
    open: bool,
    query: String,
    highlighted: usize,
    focused: bool,
    layout: PickerLayout,
}

impl<K> Picker<K> {
    pub fn new(scope: K, props: PickerProps) -> Self {
        Picker {
            scope,
            props,
            open: false,
            query: String::new(),
            highlighted: 0,
            focused: false,
            layout: PickerLayout::default(),
        }
    }

    pub fn scope(&self) -> &K {
        &self.scope
    }

    pub fn props(&self) -> &PickerProps {
        &self.props
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Disabled pickers can not receive focus.
    pub fn is_focusable(&self) -> bool {
        !self.props.disabled
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused && self.is_focusable();
    }

    pub fn layout(&self) -> PickerLayout {
        self.layout
    }

    pub fn set_layout(&mut self, mut layout: PickerLayout) {
        if !self.open {
            layout.panel = None;
            layout.list = None;
        }
        self.layout = layout;
    }

    /// Highlight index clamped to `len` options
    pub fn highlighted(&self, len: usize) -> Option<usize> {
        if len == 0 {
            None
        } else {
            Some(self.highlighted.min(len - 1))
        }
    }

    pub fn open<L: DeferredLoader<K>>(&mut self, loader: &mut L) -> Option<Transition> {
        if self.props.disabled || self.open {
            return None;
        }
        self.open = true;
        self.highlighted = 0;
        self.focused = true;
        let fetch_issued = !loader.is_loaded(&self.scope) && loader.request(&self.scope);
        Some(Transition::Opened { fetch_issued })
    }

    pub fn close(&mut self) -> Option<Transition> {
        if !self.open {
            return None;
        }
        self.open = false;
        self.highlighted = 0;
        if self.props.reset_query_on_close {
            self.query.clear();
        }
        self.layout.panel = None;
        self.layout.list = None;
        Some(Transition::Closed)
    }

    pub fn set_query(&mut self, query: &str) {
        if self.query != query {
            self.query = query.to_string();
            self.highlighted = 0;
        }
    }

    /// Apply `id` to `value`. Single values close the picker; multiple
    /// values keep it open for further toggling.
    pub fn commit<Id: Clone + PartialEq>(&mut self, id: &Id, value: &Selection<Id>) -> Response<Id> {
        if self.props.disabled {
            return Response::ignored();
        }
        let changed = value.commit(id);
        let transition = if changed.is_multiple() { None } else { self.close() };
        Response {
            changed: Some(changed),
            transition,
            consumed: true,
        }
    }

    fn filtered<'a, Id, C>(&self, options: Option<&'a [OptionEntry<Id, C>]>) -> Filtered<'a, Id, C> {
        filter(options, &self.query)
    }

    pub fn handle_key<Id, C, L>(
        &mut self,
        key: KeyEvent,
        options: Option<&[OptionEntry<Id, C>]>,
        value: &Selection<Id>,
        loader: &mut L,
    ) -> Response<Id>
    where
        Id: Clone + PartialEq,
        L: DeferredLoader<K>,
    {
        if self.props.disabled {
            return Response::ignored();
        }

        if !self.open {
            return match key.code {
                KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Down
                    if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
                {
                    Response::transition(self.open(loader))
                }
                _ => Response::ignored(),
            };
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => Response::transition(self.close()),
            // Focus is leaving: close and let the view move it
            KeyCode::Tab | KeyCode::BackTab => Response {
                consumed: false,
                ..Response::transition(self.close())
            },
            KeyCode::Up => {
                self.move_highlight(-1, options);
                Response::consumed()
            }
            KeyCode::Down => {
                self.move_highlight(1, options);
                Response::consumed()
            }
            KeyCode::Char('p') if ctrl => {
                self.move_highlight(-1, options);
                Response::consumed()
            }
            KeyCode::Char('n') if ctrl => {
                self.move_highlight(1, options);
                Response::consumed()
            }
            KeyCode::Home => {
                self.highlighted = 0;
                Response::consumed()
            }
            KeyCode::End => {
                self.highlighted = self.filtered(options).len().saturating_sub(1);
                Response::consumed()
            }
            KeyCode::Enter => {
                let filtered = self.filtered(options);
                let target = self
                    .highlighted(filtered.len())
                    .and_then(|i| filtered.get(i))
                    .map(|o| o.value.clone());
                match target {
                    Some(id) => self.commit(&id, value),
                    None => Response::consumed(),
                }
            }
            KeyCode::Backspace => {
                if self.query.pop().is_some() {
                    self.highlighted = 0;
                }
                Response::consumed()
            }
            KeyCode::Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
                self.query.push(c);
                self.highlighted = 0;
                Response::consumed()
            }
            // Open pickers are modal for the keyboard
            _ => Response::consumed(),
        }
    }

    /// Clamping highlight movement through the filtered options.
    fn move_highlight<Id, C>(&mut self, delta: i32, options: Option<&[OptionEntry<Id, C>]>) {
        let len = self.filtered(options).len();
        if len == 0 {
            self.highlighted = 0;
            return;
        }
        let current = self.highlighted.min(len - 1);
        self.highlighted = if delta < 0 {
            current.saturating_sub(delta.unsigned_abs() as usize)
        } else {
            (current + delta as usize).min(len - 1)
        };
    }

    /// Pointer press at a screen cell.
    ///
    /// Closed: a press on the trigger opens, anything else is ignored.
    /// Open: the trigger and the rest of the panel are inert, an option row
    /// commits and anything outside the trigger and panel closes.
    pub fn handle_pointer_down<Id, C, L>(
        &mut self,
        column: u16,
        row: u16,
        options: Option<&[OptionEntry<Id, C>]>,
        value: &Selection<Id>,
        loader: &mut L,
    ) -> Response<Id>
    where
        Id: Clone + PartialEq,
        L: DeferredLoader<K>,
    {
        let pos = Position::new(column, row);
        if !self.open {
            if hit(self.layout.trigger, pos) && !self.props.disabled {
                return Response::transition(self.open(loader));
            }
            return Response::ignored();
        }

        if hit(self.layout.trigger, pos) {
            return Response::consumed();
        }
        if let Some(list) = self.layout.list
            && list.contains(pos)
        {
            let index = self.layout.first_visible + (row - list.y) as usize;
            let filtered = self.filtered(options);
            if let Some(id) = filtered.get(index).map(|o| o.value.clone()) {
                self.highlighted = index;
                return self.commit(&id, value);
            }
            return Response::consumed();
        }
        if hit(self.layout.panel, pos) {
            return Response::consumed();
        }
        // Outside the picker: dismiss, but let the press reach whatever is there
        Response {
            consumed: false,
            ..Response::transition(self.close())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct FakeLoader {
        loaded: HashSet<&'static str>,
        in_flight: HashSet<&'static str>,
        requests: usize,
    }

    impl DeferredLoader<&'static str> for FakeLoader {
        fn is_loaded(&self, key: &&'static str) -> bool {
            self.loaded.contains(key)
        }

        fn request(&mut self, key: &&'static str) -> bool {
            if !self.in_flight.insert(*key) {
                return false;
            }
            self.requests += 1;
            true
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn entry(id: &'static str, query: &str) -> OptionEntry<&'static str, ()> {
        OptionEntry {
            value: id,
            query: query.to_string(),
            content: (),
        }
    }

    fn index() -> Vec<OptionEntry<&'static str, ()>> {
        vec![entry("u1", "Alice Smith"), entry("u2", "Bob Jones"), entry("u3", "Carol Ali")]
    }

    fn picker(multiple: bool) -> Picker<&'static str> {
        Picker::new(
            "acme/web",
            PickerProps {
                multiple,
                ..PickerProps::default()
            },
        )
    }

    fn loaded() -> FakeLoader {
        let mut loader = FakeLoader::default();
        loader.loaded.insert("acme/web");
        loader
    }

    #[test]
    fn open_fetches_once_while_unloaded() {
        let mut p = picker(false);
        let mut loader = FakeLoader::default();
        assert_eq!(p.open(&mut loader), Some(Transition::Opened { fetch_issued: true }));
        assert!(p.is_open());
        assert!(p.is_focused());
        p.close();
        assert_eq!(p.open(&mut loader), Some(Transition::Opened { fetch_issued: false }));
        // Already open: no second transition, no request
        assert_eq!(p.open(&mut loader), None);
        assert_eq!(loader.requests, 1);
    }

    #[test]
    fn open_skips_fetch_when_loaded() {
        let mut p = picker(false);
        let mut loader = loaded();
        assert_eq!(p.open(&mut loader), Some(Transition::Opened { fetch_issued: false }));
        assert_eq!(loader.requests, 0);
    }

    #[test]
    fn disabled_picker_never_opens() {
        let mut p = Picker::new(
            "acme/web",
            PickerProps {
                disabled: true,
                ..PickerProps::default()
            },
        );
        let mut loader = FakeLoader::default();
        assert_eq!(p.open(&mut loader), None);
        let r = p.handle_key(key(KeyCode::Enter), Some(&index()[..]), &Selection::Single(None), &mut loader);
        assert_eq!(r, Response::ignored());
        assert!(!p.is_open());
        assert_eq!(loader.requests, 0);
        assert!(!p.is_focusable());
        p.set_focused(true);
        assert!(!p.is_focused());
    }

    #[test]
    fn activation_keys_open() {
        for code in [KeyCode::Enter, KeyCode::Char(' '), KeyCode::Down] {
            let mut p = picker(false);
            let r = p.handle_key(key(code), None::<&[OptionEntry<&str, ()>]>, &Selection::Single(None), &mut loaded());
            assert_eq!(r.transition, Some(Transition::Opened { fetch_issued: false }));
            assert!(r.consumed);
        }
        let mut p = picker(false);
        let r = p.handle_key(key(KeyCode::Char('x')), None::<&[OptionEntry<&str, ()>]>, &Selection::Single(None), &mut loaded());
        assert!(!r.consumed);
        assert!(!p.is_open());
    }

    #[test]
    fn escape_closes() {
        let mut p = picker(false);
        let mut loader = loaded();
        p.open(&mut loader);
        let r = p.handle_key(key(KeyCode::Esc), Some(&index()[..]), &Selection::Single(None), &mut loader);
        assert_eq!(r.transition, Some(Transition::Closed));
        assert!(!p.is_open());
    }

    #[test]
    fn arrows_clamp_at_both_ends() {
        let opts = index();
        let mut p = picker(false);
        let mut loader = loaded();
        let value = Selection::Single(None);
        p.open(&mut loader);
        p.handle_key(key(KeyCode::Up), Some(&opts[..]), &value, &mut loader);
        assert_eq!(p.highlighted(3), Some(0));
        for _ in 0..5 {
            p.handle_key(key(KeyCode::Down), Some(&opts[..]), &value, &mut loader);
        }
        assert_eq!(p.highlighted(3), Some(2));
        p.handle_key(ctrl('p'), Some(&opts[..]), &value, &mut loader);
        assert_eq!(p.highlighted(3), Some(1));
        p.handle_key(ctrl('n'), Some(&opts[..]), &value, &mut loader);
        p.handle_key(key(KeyCode::Home), Some(&opts[..]), &value, &mut loader);
        assert_eq!(p.highlighted(3), Some(0));
        p.handle_key(key(KeyCode::End), Some(&opts[..]), &value, &mut loader);
        assert_eq!(p.highlighted(3), Some(2));
    }

    #[test]
    fn single_commit_emits_once_and_closes() {
        let opts = index();
        let mut p = picker(false);
        let mut loader = loaded();
        let value = Selection::Single(None);
        p.open(&mut loader);
        p.handle_key(key(KeyCode::Down), Some(&opts[..]), &value, &mut loader);

        let r = p.handle_key(key(KeyCode::Enter), Some(&opts[..]), &value, &mut loader);
        assert_eq!(r.changed, Some(Selection::Single(Some("u2"))));
        assert_eq!(r.transition, Some(Transition::Closed));
        assert!(!p.is_open());
    }

    #[test]
    fn multi_commit_toggles_and_stays_open() {
        let opts = index();
        let mut p = picker(true);
        let mut loader = loaded();
        let original = Selection::Multiple(vec!["u3"]);
        p.open(&mut loader);

        let first = p.handle_key(key(KeyCode::Enter), Some(&opts[..]), &original, &mut loader);
        let after_first = first.changed.unwrap();
        assert_eq!(after_first, Selection::Multiple(vec!["u3", "u1"]));
        assert_eq!(first.transition, None);
        assert!(p.is_open());

        let second = p.handle_key(key(KeyCode::Enter), Some(&opts[..]), &after_first, &mut loader);
        assert_eq!(second.changed, Some(original));
        assert!(p.is_open());
    }

    #[test]
    fn typing_filters_and_resets_highlight() {
        let opts = index();
        let mut p = picker(false);
        let mut loader = loaded();
        let value = Selection::Single(None);
        p.open(&mut loader);
        p.handle_key(key(KeyCode::Down), Some(&opts[..]), &value, &mut loader);
        for c in "ALI".chars() {
            p.handle_key(key(KeyCode::Char(c)), Some(&opts[..]), &value, &mut loader);
        }
        assert_eq!(p.query(), "ALI");
        p.handle_key(key(KeyCode::Down), Some(&opts[..]), &value, &mut loader);
        let r = p.handle_key(key(KeyCode::Enter), Some(&opts[..]), &value, &mut loader);
        // "ali" matches u1 and u3; second match is u3
        assert_eq!(r.changed, Some(Selection::Single(Some("u3"))));
    }

    #[test]
    fn enter_with_no_matches_or_loading_is_noop() {
        let opts = index();
        let mut p = picker(false);
        let mut loader = loaded();
        let value = Selection::Single(None);
        p.open(&mut loader);
        p.set_query("zzz");
        let r = p.handle_key(key(KeyCode::Enter), Some(&opts[..]), &value, &mut loader);
        assert_eq!(r.changed, None);
        assert!(r.consumed);
        assert!(p.is_open());

        let r = p.handle_key(key(KeyCode::Enter), None::<&[OptionEntry<&str, ()>]>, &value, &mut loader);
        assert_eq!(r.changed, None);
        assert!(p.is_open());
    }

    #[test]
    fn query_resets_on_close_by_default() {
        let mut p = picker(false);
        let mut loader = loaded();
        p.open(&mut loader);
        p.set_query("bob");
        p.close();
        assert_eq!(p.query(), "");

        let mut keep = Picker::new(
            "acme/web",
            PickerProps {
                reset_query_on_close: false,
                ..PickerProps::default()
            },
        );
        keep.open(&mut loader);
        keep.set_query("bob");
        keep.close();
        assert_eq!(keep.query(), "bob");
    }

    #[test]
    fn tab_closes_without_consuming() {
        let mut p = picker(true);
        let mut loader = loaded();
        p.open(&mut loader);
        let r = p.handle_key(key(KeyCode::Tab), Some(&index()[..]), &Selection::Multiple(vec![]), &mut loader);
        assert_eq!(r.transition, Some(Transition::Closed));
        assert!(!r.consumed);
    }

    fn laid_out(p: &mut Picker<&'static str>) {
        p.set_layout(PickerLayout {
            trigger: Some(Rect::new(10, 2, 20, 1)),
            panel: Some(Rect::new(10, 3, 30, 6)),
            list: Some(Rect::new(11, 5, 28, 3)),
            first_visible: 0,
        });
    }

    #[test]
    fn outside_click_while_closed_does_nothing() {
        let mut p = picker(false);
        let mut loader = loaded();
        laid_out(&mut p);
        let r = p.handle_pointer_down(0, 0, Some(&index()[..]), &Selection::Single(None), &mut loader);
        assert_eq!(r, Response::ignored());
        assert!(!p.is_open());
    }

    #[test]
    fn pointer_on_trigger_opens_and_keeps_open() {
        let mut p = picker(true);
        let mut loader = loaded();
        laid_out(&mut p);
        let value = Selection::Multiple(vec!["u1"]);
        let r = p.handle_pointer_down(12, 2, Some(&index()[..]), &value, &mut loader);
        assert_eq!(r.transition, Some(Transition::Opened { fetch_issued: false }));
        laid_out(&mut p);

        let r = p.handle_pointer_down(12, 2, Some(&index()[..]), &value, &mut loader);
        assert_eq!(r.transition, None);
        assert_eq!(r.changed, None);
        assert!(r.consumed);
        assert!(p.is_open());
        assert_eq!(loader.requests, 0);
    }

    #[test]
    fn pointer_outside_open_picker_dismisses() {
        let mut p = picker(true);
        let mut loader = loaded();
        let value = Selection::Multiple(vec![]);
        p.open(&mut loader);
        laid_out(&mut p);

        // Inside the panel but not on a row: stays open
        let r = p.handle_pointer_down(12, 3, Some(&index()[..]), &value, &mut loader);
        assert!(r.consumed);
        assert!(p.is_open());

        let r = p.handle_pointer_down(60, 20, Some(&index()[..]), &value, &mut loader);
        assert_eq!(r.transition, Some(Transition::Closed));
        assert_eq!(r.changed, None);
        assert!(!r.consumed);
        assert_eq!(p.layout().panel, None);
    }

    #[test]
    fn pointer_on_row_commits_that_option() {
        let opts = index();
        let mut p = picker(true);
        let mut loader = loaded();
        let value = Selection::Multiple(vec![]);
        p.open(&mut loader);
        laid_out(&mut p);
        let r = p.handle_pointer_down(15, 6, Some(&opts[..]), &value, &mut loader);
        assert_eq!(r.changed, Some(Selection::Multiple(vec!["u2"])));
        assert!(p.is_open());
        assert_eq!(p.highlighted(3), Some(1));

        // Row past the end of the list
        p.set_query("bob");
        let r = p.handle_pointer_down(15, 7, Some(&opts[..]), &value, &mut loader);
        assert_eq!(r.changed, None);
        assert!(r.consumed);
    }
}
