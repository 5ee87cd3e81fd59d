//! File-based entry points bound to the process-wide engine.

use std::collections::HashMap;
use std::path::Path;

use lgs_config::{
    ResultExt, SetupResult, Table, parse_document, read_document, read_text, remove_logger_entry,
    render, upsert_logger_level, write_document,
};
use lgs_core::{build_from_document, build_from_document_with_override, build_from_text};

use crate::backend::EngineBackend;
use crate::logger::Logger;

/// Build and register everything declared in `text`.
pub fn from_str(text: &str) -> SetupResult<()> {
    build_from_text(text, &mut EngineBackend::new())
}

pub fn from_file(path: &Path) -> SetupResult<()> {
    let doc = read_document(path)?;
    build_from_document(&doc, &mut EngineBackend::new())
}

/// Build from `base`, merged with `overlay` when that file exists.
///
/// Returns whether the override file was found and applied.
pub fn from_file_with_override(base: &Path, overlay: &Path) -> SetupResult<bool> {
    let base_doc = read_document(base)?;
    build_with_optional_override(&base_doc, overlay, read_document)
}

/// Render `{{ key }}` tags in the file with `vars`, then build it.
pub fn from_file_with_tag_replacement(path: &Path, vars: &HashMap<String, String>) -> SetupResult<()> {
    let doc = read_rendered(path, vars)?;
    build_from_document(&doc, &mut EngineBackend::new())
}

/// Like [`from_file_with_override`], rendering both files with `vars`.
pub fn from_file_and_override_with_tag_replacement(
    base: &Path,
    overlay: &Path,
    vars: &HashMap<String, String>,
) -> SetupResult<bool> {
    let base_doc = read_rendered(base, vars)?;
    build_with_optional_override(&base_doc, overlay, |path| read_rendered(path, vars))
}

fn build_with_optional_override<F>(base: &Table, overlay: &Path, read: F) -> SetupResult<bool>
where
    F: FnOnce(&Path) -> SetupResult<Table>,
{
    let mut backend = EngineBackend::new();
    if !overlay.exists() {
        lgs_debug!(conf, path = %overlay.display(), "override file not found, using base only");
        build_from_document(base, &mut backend)?;
        return Ok(false);
    }
    let overlay_doc = read(overlay)?;
    build_from_document_with_override(base, &overlay_doc, &mut backend)?;
    Ok(true)
}

fn read_rendered(path: &Path, vars: &HashMap<String, String>) -> SetupResult<Table> {
    let text = read_text(path)?;
    parse_document(&render(&text, vars))
        .with_setup_context(|| format!("Unable to parse file at '{}'", path.display()))
}

/// Record `logger`'s name and current level in the document at `path`.
///
/// With `overwrite` the file is replaced by a document holding only this
/// entry. Otherwise an existing file is updated in place, touching only the
/// entry's `level`; a missing file is treated as empty.
pub fn save_logger_to_file(logger: &Logger, path: &Path, overwrite: bool) -> SetupResult<()> {
    let mut doc = if overwrite || !path.exists() {
        Table::new()
    } else {
        read_document(path)
            .with_setup_context(|| format!("Unable to parse file at '{}' for saving", path.display()))?
    };
    upsert_logger_level(&mut doc, logger.name(), logger.level())?;
    write_document(&doc, path)
}

/// Remove the logger entry `name` from the document at `path`.
///
/// Returns `false`, leaving the file untouched, when no entry has that name.
/// A document without any logger entries is an error.
pub fn delete_logger_in_file(name: &str, path: &Path) -> SetupResult<bool> {
    let mut doc = read_document(path).with_setup_context(|| {
        format!(
            "Unable to parse file at '{}' for deleting logger '{name}'",
            path.display()
        )
    })?;
    let removed = remove_logger_entry(&mut doc, name)
        .with_setup_context(|| format!("Error in file at '{}'", path.display()))?;
    if removed {
        write_document(&doc, path)?;
    }
    Ok(removed)
}
