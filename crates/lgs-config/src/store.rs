use std::io::ErrorKind;
use std::path::Path;

use toml::{Table, Value};

use crate::doc::{position_by_name, table_array_mut};
use crate::error::{ResultExt, SetupError, SetupResult};
use crate::names;
use crate::types::Level;

// ---------------------------------------------------------------------------
// Reading and writing documents
// ---------------------------------------------------------------------------

/// Parse configuration text into a document.
pub fn parse_document(text: &str) -> SetupResult<Table> {
    text.parse::<Table>()
        .map_err(|e| SetupError::new(format!("Invalid configuration document: {e}")))
}

/// Read and parse the document at `path`.
///
/// A missing file and unparsable content fail with different messages
/// (`Unable to find ...` vs. `Unable to parse ...`).
pub fn read_document(path: &Path) -> SetupResult<Table> {
    let text = read_text(path)?;
    parse_document(&text).with_setup_context(|| format!("Unable to parse file at '{}'", path.display()))
}

/// Read raw configuration text (e.g. a pre-TOML template).
pub fn read_text(path: &Path) -> SetupResult<String> {
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => SetupError::new(format!(
            "Unable to find configuration file at '{}'",
            path.display()
        )),
        _ => SetupError::new(format!("Error reading file at '{}': {e}", path.display())),
    })
}

/// Serialize `doc` as TOML and write it to `path`, replacing any content.
pub fn write_document(doc: &Table, path: &Path) -> SetupResult<()> {
    let text = toml::to_string(doc)
        .with_setup_context(|| format!("Unable to serialize document for '{}'", path.display()))?;
    std::fs::write(path, text)
        .with_setup_context(|| format!("Unable to open '{}' for writing", path.display()))
}

// ---------------------------------------------------------------------------
// Logger entries
// ---------------------------------------------------------------------------

/// Record `level` for logger `name` in the document's `logger` array.
///
/// The array and the entry are created when missing. Only the `level` field
/// of an existing entry is touched; its other fields are preserved.
pub fn upsert_logger_level(doc: &mut Table, name: &str, level: Level) -> SetupResult<()> {
    if !doc.contains_key(names::LOGGER_TABLE) {
        doc.insert(names::LOGGER_TABLE.to_string(), Value::Array(Vec::new()));
    }
    let Some(items) = table_array_mut(doc, names::LOGGER_TABLE)? else {
        return Err(SetupError::new("Unable to create logger table array"));
    };

    let level = Value::String(level.as_str().to_string());
    match position_by_name(items, name) {
        Some(idx) => {
            if let Value::Table(entry) = &mut items[idx] {
                entry.insert(names::LEVEL.to_string(), level);
            }
        }
        None => {
            let mut entry = Table::new();
            entry.insert(names::NAME.to_string(), Value::String(name.to_string()));
            entry.insert(names::LEVEL.to_string(), level);
            items.push(Value::Table(entry));
        }
    }
    Ok(())
}

/// Remove the logger entry called `name`.
///
/// Returns `Ok(false)` and leaves the document unchanged when no entry
/// matches. A document without any `logger` array is an error. Removing the
/// last entry drops the `logger` key altogether.
pub fn remove_logger_entry(doc: &mut Table, name: &str) -> SetupResult<bool> {
    let Some(items) = table_array_mut(doc, names::LOGGER_TABLE)? else {
        return Err(SetupError::new("Unable to find any logger table array"));
    };

    let Some(idx) = position_by_name(items, name) else {
        return Ok(false);
    };
    items.remove(idx);

    if items.is_empty() {
        doc.remove(names::LOGGER_TABLE);
    }
    Ok(true)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
