use toml::{Table, Value};

use crate::doc::{entry_name, find_by_name_mut, table_array, table_array_mut};
use crate::error::{SetupError, SetupResult};
use crate::names;

/// Sections merged entry-by-entry, keyed on each entry's `name`.
pub const MERGED_SECTIONS: [&str; 3] = [names::SINK_TABLE, names::PATTERN_TABLE, names::LOGGER_TABLE];

/// Overlay `overlay` onto `base` for the `sink`, `pattern` and `logger`
/// sections.
///
/// - An overlay entry whose `name` matches a base entry has its fields written
///   over the base entry's fields. Nested tables are replaced, not merged.
/// - An overlay entry with a new name is appended.
/// - A section the base lacks is adopted from the overlay as-is.
/// - Every other key (`global_pattern`, `thread_pool`, ...) is left alone.
///
/// An overlay entry without a `name` is an error since it cannot be matched.
pub fn merge_documents(base: &mut Table, overlay: &Table) -> SetupResult<()> {
    for section in MERGED_SECTIONS {
        merge_section(base, overlay, section)?;
    }
    Ok(())
}

fn merge_section(base: &mut Table, overlay: &Table, section: &str) -> SetupResult<()> {
    let Some(overlay_items) = table_array(overlay, section)? else {
        return Ok(());
    };

    let Some(base_items) = table_array_mut(base, section)? else {
        let adopted = overlay_items
            .into_iter()
            .map(|t| Value::Table(t.clone()))
            .collect();
        base.insert(section.to_string(), Value::Array(adopted));
        lgs_debug!(conf, section, "adopted override section");
        return Ok(());
    };

    for item in overlay_items {
        let name = entry_name(item).ok_or_else(|| {
            SetupError::new(format!(
                "One of the items in override '{section}' does not have a name"
            ))
        })?;

        match find_by_name_mut(base_items, name) {
            Some(entry) => {
                for (key, value) in item {
                    entry.insert(key.clone(), value.clone());
                }
                lgs_debug!(conf, section, name, "merged override entry");
            }
            None => {
                base_items.push(Value::Table(item.clone()));
                lgs_debug!(conf, section, name, "appended override entry");
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
