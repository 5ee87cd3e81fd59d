use std::collections::HashMap;

use lgs_config::doc::{required, table_array};
use lgs_config::{SetupResult, Table, names};

/// Named format strings from the document's `pattern` array.
///
/// A name declared twice keeps the position of its first declaration and the
/// value of its last.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PatternTable {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl PatternTable {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.index.get(name).map(|&i| self.entries[i].1.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    fn insert(&mut self, name: String, value: String) {
        match self.index.get(&name) {
            Some(&i) => {
                lgs_warn!(conf, pattern = %name, "pattern declared more than once, last value wins");
                self.entries[i].1 = value;
            }
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push((name, value));
            }
        }
    }
}

/// Build the pattern table; a document without a `pattern` array yields an
/// empty table.
pub fn build_patterns(doc: &Table) -> SetupResult<PatternTable> {
    let mut table = PatternTable::default();
    let Some(entries) = table_array(doc, names::PATTERN_TABLE)? else {
        return Ok(table);
    };

    for entry in entries {
        let name: String = required(entry, names::NAME, || {
            format!("One of the patterns does not have a '{}' field", names::NAME)
        })?;
        let value: String = required(entry, names::VALUE, || {
            format!("Pattern '{name}' does not have a '{}' field", names::VALUE)
        })?;
        table.insert(name, value);
    }

    lgs_debug!(conf, count = table.len(), "patterns loaded");
    Ok(table)
}
