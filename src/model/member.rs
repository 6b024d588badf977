use serde::{Deserialize, Serialize};

/// A workspace member as stored in the directory.
///
/// Every display field is optional: directories synced from other tools are
/// frequently missing names, and a member must still be pickable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Single glyph shown in place of an avatar image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Treat blank strings the same as missing fields.
fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl Member {
    pub fn new(id: &str) -> Self {
        Member {
            id: id.to_string(),
            display_name: None,
            first_name: None,
            last_name: None,
            avatar: None,
            email: None,
        }
    }

    /// Searchable text: display name, first name and last name joined by
    /// spaces. Missing fields are skipped; a member with no names at all is
    /// searchable by id.
    pub fn search_text(&self) -> String {
        let parts: Vec<&str> = [&self.display_name, &self.first_name, &self.last_name]
            .into_iter()
            .filter_map(present)
            .collect();
        if parts.is_empty() {
            self.id.clone()
        } else {
            parts.join(" ")
        }
    }

    /// "First Last" if either part is present
    pub fn full_name(&self) -> Option<String> {
        let parts: Vec<&str> = [&self.first_name, &self.last_name]
            .into_iter()
            .filter_map(present)
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }

    /// Best-effort label: display name, then full name, then id.
    pub fn label(&self) -> String {
        present(&self.display_name)
            .map(str::to_string)
            .or_else(|| self.full_name())
            .unwrap_or_else(|| self.id.clone())
    }

    /// Avatar glyph: the configured avatar, else the label's first letter uppercased.
    pub fn avatar_glyph(&self) -> String {
        if let Some(avatar) = present(&self.avatar) {
            return avatar.chars().next().map(String::from).unwrap_or_default();
        }
        self.label()
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_else(|| "?".to_string())
    }
}
