//! Typed access to a parsed configuration document.
//!
//! The document is a plain [`toml::Table`]. These helpers turn raw lookups
//! into typed values through `serde`, keeping "absent" and "wrong type"
//! apart so callers can phrase their own diagnostics.

use serde::de::DeserializeOwned;
use toml::{Table, Value};

use crate::error::{SetupError, SetupResult};
use crate::names;

/// Outcome of a typed field lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Present(T),
    Absent,
    /// The field exists but does not decode as the requested type.
    Mismatch(String),
}

/// Look up `field` in `table` and decode it as `T`.
pub fn lookup<T: DeserializeOwned>(table: &Table, field: &str) -> Lookup<T> {
    match table.get(field) {
        None => Lookup::Absent,
        Some(value) => match T::deserialize(value.clone()) {
            Ok(v) => Lookup::Present(v),
            Err(e) => Lookup::Mismatch(e.to_string()),
        },
    }
}

/// Required field lookup. `missing` builds the message used when the field
/// is absent; a type mismatch names the field and the decoder's complaint.
pub fn required<T, F>(table: &Table, field: &str, missing: F) -> SetupResult<T>
where
    T: DeserializeOwned,
    F: FnOnce() -> String,
{
    match lookup(table, field) {
        Lookup::Present(v) => Ok(v),
        Lookup::Absent => Err(SetupError::new(missing())),
        Lookup::Mismatch(detail) => Err(mismatch(field, &detail)),
    }
}

/// Optional field lookup; absent yields `None`, a mismatch is still an error.
pub fn optional<T: DeserializeOwned>(table: &Table, field: &str) -> SetupResult<Option<T>> {
    match lookup(table, field) {
        Lookup::Present(v) => Ok(Some(v)),
        Lookup::Absent => Ok(None),
        Lookup::Mismatch(detail) => Err(mismatch(field, &detail)),
    }
}

/// Optional field lookup with a caller-supplied default.
pub fn optional_or<T: DeserializeOwned>(table: &Table, field: &str, default: T) -> SetupResult<T> {
    Ok(optional(table, field)?.unwrap_or(default))
}

/// Required array-of-strings lookup (e.g. `sinks = ["a", "b"]`).
pub fn string_array<F>(table: &Table, field: &str, missing: F) -> SetupResult<Vec<String>>
where
    F: FnOnce() -> String,
{
    required::<Vec<String>, _>(table, field, missing)
}

fn mismatch(field: &str, detail: &str) -> SetupError {
    SetupError::new(format!("Invalid value for '{field}' field: {detail}"))
}

// ---------------------------------------------------------------------------
// Table arrays
// ---------------------------------------------------------------------------

/// Borrow every entry of the table-array `name` (e.g. `[[sink]]`).
///
/// Returns `Ok(None)` when the document has no such key; a key holding
/// anything other than an array of tables is an error.
pub fn table_array<'a>(doc: &'a Table, name: &str) -> SetupResult<Option<Vec<&'a Table>>> {
    let Some(value) = doc.get(name) else {
        return Ok(None);
    };
    let Value::Array(items) = value else {
        return Err(not_table_array(name));
    };
    items
        .iter()
        .map(|item| item.as_table().ok_or_else(|| not_table_array(name)))
        .collect::<SetupResult<Vec<_>>>()
        .map(Some)
}

/// Mutable counterpart of [`table_array`], exposing the raw entries.
pub fn table_array_mut<'a>(doc: &'a mut Table, name: &str) -> SetupResult<Option<&'a mut Vec<Value>>> {
    match doc.get_mut(name) {
        None => Ok(None),
        Some(Value::Array(items)) if items.iter().all(Value::is_table) => Ok(Some(items)),
        Some(_) => Err(not_table_array(name)),
    }
}

/// Borrow a nested table such as `[global_thread_pool]`.
pub fn sub_table<'a>(doc: &'a Table, name: &str) -> SetupResult<Option<&'a Table>> {
    match doc.get(name) {
        None => Ok(None),
        Some(Value::Table(t)) => Ok(Some(t)),
        Some(_) => Err(SetupError::new(format!("'{name}' must be a table"))),
    }
}

fn not_table_array(name: &str) -> SetupError {
    SetupError::new(format!("'{name}' must be an array of tables"))
}

/// The `name` field of an entry, if it is a string.
pub fn entry_name(entry: &Table) -> Option<&str> {
    entry.get(names::NAME).and_then(Value::as_str)
}

/// Position of the entry whose `name` equals `name`.
pub fn position_by_name(items: &[Value], name: &str) -> Option<usize> {
    items
        .iter()
        .position(|item| item.as_table().and_then(entry_name) == Some(name))
}

/// Mutable access to the entry whose `name` equals `name`.
pub fn find_by_name_mut<'a>(items: &'a mut [Value], name: &str) -> Option<&'a mut Table> {
    items.iter_mut().find_map(|item| match item {
        Value::Table(t) if entry_name(t) == Some(name) => Some(t),
        _ => None,
    })
}
