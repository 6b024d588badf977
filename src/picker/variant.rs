use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Trigger button appearance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ButtonVariant {
    #[default]
    BorderWithText,
    BorderWithoutText,
    BackgroundWithText,
    BackgroundWithoutText,
    TransparentWithText,
    TransparentWithoutText,
}

/// Visual family of a trigger; each family has one renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonStyle {
    Border,
    Background,
    Transparent,
}

/// Variant → (name, style family, hide_text)
const VARIANTS: [(ButtonVariant, &str, ButtonStyle, bool); 6] = [
    (ButtonVariant::BorderWithText, "border-with-text", ButtonStyle::Border, false),
    (ButtonVariant::BorderWithoutText, "border-without-text", ButtonStyle::Border, true),
    (ButtonVariant::BackgroundWithText, "background-with-text", ButtonStyle::Background, false),
    (ButtonVariant::BackgroundWithoutText, "background-without-text", ButtonStyle::Background, true),
    (ButtonVariant::TransparentWithText, "transparent-with-text", ButtonStyle::Transparent, false),
    (ButtonVariant::TransparentWithoutText, "transparent-without-text", ButtonStyle::Transparent, true),
];

impl ButtonVariant {
    fn row(self) -> (ButtonVariant, &'static str, ButtonStyle, bool) {
        VARIANTS
            .iter()
            .copied()
            .find(|(v, ..)| *v == self)
            .unwrap_or(VARIANTS[0])
    }

    pub fn style(self) -> ButtonStyle {
        self.row().2
    }

    pub fn hide_text(self) -> bool {
        self.row().3
    }

    pub fn as_str(self) -> &'static str {
        self.row().1
    }
}

impl fmt::Display for ButtonVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ButtonVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VARIANTS
            .iter()
            .find(|(_, name, ..)| *name == s)
            .map(|(v, ..)| *v)
            .ok_or_else(|| format!("unknown button variant '{}'", s))
    }
}
