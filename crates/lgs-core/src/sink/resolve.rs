use std::collections::HashMap;

use lgs_config::doc::{entry_name, optional, optional_or, table_array};
use lgs_config::{Level, ResultExt, SetupError, SetupResult, Table, names, setup_bail};

use crate::backend::LogBackend;

use super::kind::{SinkKind, SinkType};

// ---------------------------------------------------------------------------
// SinkTable
// ---------------------------------------------------------------------------

/// Resolved sinks by name, iterable in declaration order.
#[derive(Debug)]
pub struct SinkTable<S> {
    order: Vec<String>,
    sinks: HashMap<String, S>,
}

impl<S> Default for SinkTable<S> {
    fn default() -> Self {
        Self {
            order: Vec::new(),
            sinks: HashMap::new(),
        }
    }
}

impl<S> SinkTable<S> {
    pub fn get(&self, name: &str) -> Option<&S> {
        self.sinks.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sinks.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    fn insert(&mut self, name: &str, sink: S) {
        self.order.push(name.to_string());
        self.sinks.insert(name.to_string(), sink);
    }
}

// ---------------------------------------------------------------------------
// Declarations (first pass)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct Declaration<'a> {
    name: &'a str,
    ty: SinkType,
    table: &'a Table,
}

struct Declarations<'a> {
    order: Vec<Declaration<'a>>,
    index: HashMap<&'a str, usize>,
}

impl<'a> Declarations<'a> {
    /// Validate names and types of every entry and index them by name.
    fn collect(entries: &[&'a Table]) -> SetupResult<Self> {
        let mut order = Vec::with_capacity(entries.len());
        let mut index = HashMap::with_capacity(entries.len());

        for table in entries.iter().copied() {
            let Some(name) = entry_name(table) else {
                setup_bail!("One of the sinks does not have a '{}' field", names::NAME);
            };
            let Some(ty) = table.get(names::TYPE).and_then(|v| v.as_str()) else {
                setup_bail!("Sink '{name}' does not have a '{}' field", names::TYPE);
            };
            let ty = ty
                .parse::<SinkType>()
                .with_setup_context(|| sink_context(name))?;
            if index.insert(name, order.len()).is_some() {
                setup_bail!("Sink '{name}' declared more than once");
            }
            order.push(Declaration { name, ty, table });
        }
        Ok(Self { order, index })
    }

    fn get(&self, name: &str) -> Option<Declaration<'a>> {
        self.index.get(name).map(|&i| self.order[i])
    }
}

// ---------------------------------------------------------------------------
// Resolver (depth-first construction)
// ---------------------------------------------------------------------------

/// Build every sink declared in the document's `sink` array.
///
/// Aggregating sinks are resolved depth-first so their targets exist before
/// they do, whatever the declaration order. Each sink is built once; every
/// aggregator naming it receives a clone of the same handle. A reference
/// cycle fails with the path that closes it.
pub fn resolve_sinks<B: LogBackend>(doc: &Table, backend: &mut B) -> SetupResult<SinkTable<B::Sink>> {
    let Some(entries) = table_array(doc, names::SINK_TABLE)? else {
        setup_bail!("No sinks configured for set-up");
    };
    let decls = Declarations::collect(&entries)?;

    let mut resolver = Resolver {
        decls: &decls,
        marks: HashMap::new(),
        path: Vec::new(),
        table: SinkTable::default(),
        backend,
    };
    for decl in &decls.order {
        resolver.visit(decl.name)?;
    }

    let table = resolver.table;
    lgs_debug!(sink, count = table.len(), "sinks resolved");
    Ok(table)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

struct Resolver<'d, 'a, B: LogBackend> {
    decls: &'d Declarations<'a>,
    marks: HashMap<&'a str, Mark>,
    /// Names currently being resolved, outermost first.
    path: Vec<&'a str>,
    table: SinkTable<B::Sink>,
    backend: &'d mut B,
}

impl<'a, B: LogBackend> Resolver<'_, 'a, B> {
    fn visit(&mut self, name: &'a str) -> SetupResult<B::Sink> {
        match self.marks.get(name) {
            Some(Mark::Done) => {
                if let Some(sink) = self.table.get(name) {
                    return Ok(sink.clone());
                }
            }
            Some(Mark::InProgress) => return Err(self.cycle(name)),
            None => {}
        }

        let Some(decl) = self.decls.get(name) else {
            setup_bail!("Unable to find sink '{name}'");
        };
        lgs_trace!(sink, sink = name, depth = self.path.len(), "resolving sink");

        self.marks.insert(name, Mark::InProgress);
        self.path.push(name);
        let sink = self.build(decl)?;
        self.path.pop();
        self.marks.insert(name, Mark::Done);

        self.table.insert(name, sink.clone());
        Ok(sink)
    }

    fn build(&mut self, decl: Declaration<'a>) -> SetupResult<B::Sink> {
        let kind = SinkKind::decode(decl.ty, decl.table).with_setup_context(|| sink_context(decl.name))?;

        // Targets resolve through `visit`, which reports its own errors.
        let mut forwards = Vec::with_capacity(kind.forwards().len());
        for target in kind.forwards() {
            let Some(target) = self.decls.get(target) else {
                return Err(SetupError::new(format!(
                    "Unable to find sink '{target}' referenced by sink '{}'",
                    decl.name
                ))
                .context(sink_context(decl.name)));
            };
            forwards.push(self.visit(target.name)?);
        }

        self.construct(decl, &kind, forwards)
            .with_setup_context(|| sink_context(decl.name))
    }

    fn construct(
        &mut self,
        decl: Declaration<'a>,
        kind: &SinkKind,
        forwards: Vec<B::Sink>,
    ) -> SetupResult<B::Sink> {
        if optional_or(decl.table, names::CREATE_PARENT_DIR, false)? {
            if let Some(parent) = kind.file_path().and_then(|p| p.parent()) {
                if !parent.as_os_str().is_empty() {
                    self.backend.create_dir_all(parent)?;
                }
            }
        }

        let sink = self.backend.create_sink(decl.name, kind, forwards)?;

        if let Some(level) = optional::<String>(decl.table, names::LEVEL)? {
            let level: Level = level.parse()?;
            self.backend.set_sink_level(&sink, level);
        }

        lgs_debug!(sink, sink = decl.name, kind = %decl.ty, "sink built");
        Ok(sink)
    }

    fn cycle(&self, name: &str) -> SetupError {
        let start = self.path.iter().position(|n| *n == name).unwrap_or(0);
        let mut chain: Vec<&str> = self.path[start..].to_vec();
        chain.push(name);
        SetupError::new(format!(
            "Sink reference cycle detected: {}",
            chain.join(" -> ")
        ))
    }
}

fn sink_context(name: &str) -> String {
    format!("Sink '{name}' error")
}
