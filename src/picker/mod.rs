//! Searchable single/multi select core.
//!
//! Everything here is a pure function of the options and value handed in
//! plus the picker's own open/query/highlight state. Rendering, fetching and
//! storage live elsewhere.

pub mod controller;
pub mod filter;
pub mod options;
pub mod placement;
pub mod selection;
pub mod variant;

pub use controller::{DeferredLoader, Picker, PickerLayout, PickerProps, Response, Transition};
pub use filter::{Filtered, filter};
pub use options::{MemberContent, OptionEntry, build_options, member_options};
pub use placement::{Align, Placement, Side, compute_panel_rect};
pub use selection::Selection;
pub use variant::{ButtonStyle, ButtonVariant};
