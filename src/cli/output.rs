use serde::Serialize;

use crate::model::{FieldConfig, Member};
use crate::picker::{MemberContent, OptionEntry, Selection};

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct MemberJson {
    pub id: String,
    pub label: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_you: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Serialize)]
pub struct MemberListJson {
    pub project: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    pub members: Vec<MemberJson>,
}

#[derive(Serialize)]
pub struct FieldJson {
    pub id: String,
    pub label: String,
    pub project: String,
    pub multiple: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub disabled: bool,
    pub value: Selection<String>,
}

pub fn member_to_json(entry: &OptionEntry<String, MemberContent>, member: Option<&Member>) -> MemberJson {
    MemberJson {
        id: entry.value.clone(),
        label: entry.content.label.clone(),
        is_you: entry.content.is_you,
        email: member.and_then(|m| m.email.clone()),
    }
}

pub fn field_to_json(field: &FieldConfig) -> FieldJson {
    FieldJson {
        id: field.id.clone(),
        label: field.label.clone(),
        project: field.project.clone(),
        multiple: field.multiple,
        disabled: field.disabled,
        value: field.selection(),
    }
}
