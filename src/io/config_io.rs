use std::fs;
use std::path::Path;

use crate::io::lock::FileLock;
use crate::io::workspace_io::{CONFIG_FILE, WorkspaceError, atomic_write};
use crate::picker::Selection;

/// Read workspace.toml as a toml_edit document for round-trip-safe editing.
pub fn read_document(roster_dir: &Path) -> Result<toml_edit::DocumentMut, WorkspaceError> {
    let config_path = roster_dir.join(CONFIG_FILE);
    let text = fs::read_to_string(&config_path).map_err(|e| WorkspaceError::ReadError {
        path: config_path.clone(),
        source: e,
    })?;
    Ok(text.parse::<toml_edit::DocumentMut>()?)
}

/// Write the document back to disk, preserving formatting.
pub fn write_document(roster_dir: &Path, doc: &toml_edit::DocumentMut) -> Result<(), WorkspaceError> {
    let config_path = roster_dir.join(CONFIG_FILE);
    atomic_write(&config_path, doc.to_string().as_bytes()).map_err(|e| WorkspaceError::WriteError {
        path: config_path,
        source: e,
    })
}

/// Set a field's `value` in the document. Empty selections remove the key.
/// Returns false when no `[[fields]]` entry has the given id.
pub fn set_field_value(doc: &mut toml_edit::DocumentMut, field_id: &str, value: &Selection<String>) -> bool {
    let Some(fields) = doc.get_mut("fields").and_then(|f| f.as_array_of_tables_mut()) else {
        return false;
    };
    for table in fields.iter_mut() {
        if table.get("id").and_then(|v| v.as_str()) != Some(field_id) {
            continue;
        }
        match value {
            Selection::Single(None) => {
                table.remove("value");
            }
            Selection::Single(Some(id)) => {
                table["value"] = toml_edit::value(id.as_str());
            }
            Selection::Multiple(ids) if ids.is_empty() => {
                table.remove("value");
            }
            Selection::Multiple(ids) => {
                let mut array = toml_edit::Array::new();
                for id in ids {
                    array.push(id.as_str());
                }
                table["value"] = toml_edit::value(array);
            }
        }
        return true;
    }
    false
}

/// Current `value` of a field in the document, shaped by its `multiple` flag.
/// None when no `[[fields]]` entry has the given id.
pub fn field_value(doc: &toml_edit::DocumentMut, field_id: &str) -> Option<Selection<String>> {
    let fields = doc.get("fields")?.as_array_of_tables()?;
    let table = fields
        .iter()
        .find(|t| t.get("id").and_then(|v| v.as_str()) == Some(field_id))?;
    let multiple = table.get("multiple").and_then(|v| v.as_bool()).unwrap_or(false);
    let value = match table.get("value") {
        Some(item) if multiple => Selection::Multiple(
            item.as_array()
                .map(|a| a.iter().filter_map(|v| v.as_str().map(String::from)).collect())
                .unwrap_or_default(),
        ),
        Some(item) => Selection::Single(item.as_str().map(String::from)),
        None => Selection::empty(multiple),
    };
    Some(value)
}

/// Read-modify-write one field value under the workspace lock. `update`
/// receives the value currently on disk, so a change saved by another
/// process since the caller last loaded the workspace is not lost.
///
/// Returns the value written, or None when the field is not in the file.
pub fn update_field_value<F>(
    roster_dir: &Path,
    field_id: &str,
    update: F,
) -> Result<Option<Selection<String>>, Box<dyn std::error::Error>>
where
    F: FnOnce(&Selection<String>) -> Selection<String>,
{
    let _lock = FileLock::acquire_default(roster_dir)?;
    let mut doc = read_document(roster_dir)?;
    let Some(current) = field_value(&doc, field_id) else {
        return Ok(None);
    };
    let value = update(&current);
    if !set_field_value(&mut doc, field_id, &value) {
        return Ok(None);
    }
    write_document(roster_dir, &doc)?;
    tracing::info!(field = field_id, value = ?value, "saved field value");
    Ok(Some(value))
}

/// Persist one field value under the workspace lock, replacing whatever is on disk.
pub fn save_field_value(roster_dir: &Path, field_id: &str, value: &Selection<String>) -> Result<bool, Box<dyn std::error::Error>> {
    Ok(update_field_value(roster_dir, field_id, |_| value.clone())?.is_some())
}
