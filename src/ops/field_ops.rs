use crate::model::{FieldConfig, WorkspaceConfig};
use crate::picker::Selection;

/// Error type for field edits
#[derive(Debug, thiserror::Error)]
pub enum FieldError {
    #[error("unknown field '{0}'")]
    UnknownField(String),
    #[error("field '{0}' is disabled")]
    Disabled(String),
    #[error("'{member}' is not a member of project '{project}'")]
    NotAProjectMember { member: String, project: String },
    #[error("field '{field}' refers to unknown project '{project}'")]
    UnknownProject { field: String, project: String },
}

/// Look up a field that may be edited.
pub fn editable_field<'a>(config: &'a WorkspaceConfig, field_id: &str) -> Result<&'a FieldConfig, FieldError> {
    let field = config
        .field(field_id)
        .ok_or_else(|| FieldError::UnknownField(field_id.to_string()))?;
    if field.disabled {
        return Err(FieldError::Disabled(field.id.clone()));
    }
    Ok(field)
}

/// Check that every id belongs to the field's project.
pub fn validate_members(config: &WorkspaceConfig, field: &FieldConfig, ids: &[String]) -> Result<(), FieldError> {
    let project = config
        .project(&field.project)
        .ok_or_else(|| FieldError::UnknownProject {
            field: field.id.clone(),
            project: field.project.clone(),
        })?;
    for id in ids {
        if !project.members.contains(id) {
            return Err(FieldError::NotAProjectMember {
                member: id.clone(),
                project: project.id.clone(),
            });
        }
    }
    Ok(())
}

/// Commit each id in turn, as if picked one after another.
/// On a single field the last id wins; on a multiple field each id toggles.
pub fn apply_commits(current: &Selection<String>, ids: &[String]) -> Selection<String> {
    ids.iter().fold(current.clone(), |value, id| value.commit(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config() -> WorkspaceConfig {
        toml::from_str(
            r#"
[workspace]
slug = "acme"

[[projects]]
id = "web"
name = "Web"
members = ["u1", "u2"]

[[fields]]
id = "lead"
label = "Lead"
project = "web"

[[fields]]
id = "locked"
label = "Locked"
project = "web"
disabled = true

[[fields]]
id = "orphan"
label = "Orphan"
project = "gone"
"#,
        )
        .unwrap()
    }

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn editable_field_rejects_unknown_and_disabled() {
        let config = config();
        assert!(editable_field(&config, "lead").is_ok());
        assert!(matches!(editable_field(&config, "nope"), Err(FieldError::UnknownField(_))));
        assert!(matches!(editable_field(&config, "locked"), Err(FieldError::Disabled(_))));
    }

    #[test]
    fn validate_members_checks_project_roster() {
        let config = config();
        let lead = config.field("lead").unwrap();
        assert!(validate_members(&config, lead, &ids(&["u1", "u2"])).is_ok());
        let err = validate_members(&config, lead, &ids(&["u9"])).unwrap_err();
        assert_eq!(err.to_string(), "'u9' is not a member of project 'web'");

        let orphan = config.field("orphan").unwrap();
        assert!(matches!(
            validate_members(&config, orphan, &ids(&["u1"])),
            Err(FieldError::UnknownProject { .. })
        ));
    }

    #[test]
    fn apply_commits_single_last_wins() {
        let value = apply_commits(&Selection::Single(None), &ids(&["u1", "u2"]));
        assert_eq!(value, Selection::Single(Some("u2".into())));
    }

    #[test]
    fn apply_commits_multiple_toggles() {
        let start = Selection::Multiple(ids(&["u1"]));
        let value = apply_commits(&start, &ids(&["u2", "u1"]));
        assert_eq!(value, Selection::Multiple(ids(&["u2"])));
    }
}
