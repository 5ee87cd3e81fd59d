//! Build entry points: document in, registered loggers out.

use std::collections::HashMap;

use lgs_config::doc::optional;
use lgs_config::{SetupResult, Table, merge_documents, names, parse_document, render};

use crate::backend::LogBackend;
use crate::logger::{LoggerInputs, build_loggers};
use crate::pattern::build_patterns;
use crate::sink::resolve_sinks;
use crate::thread_pool::setup_thread_pools;

/// Build every sink, pattern, thread pool and logger the document declares
/// and register the loggers with `backend`.
///
/// Stages run strictly in order: sinks, patterns, thread pools, loggers.
/// Loggers registered before a failing logger stay registered.
pub fn build_from_document<B: LogBackend>(doc: &Table, backend: &mut B) -> SetupResult<()> {
    let sinks = resolve_sinks(doc, backend)?;
    let patterns = build_patterns(doc)?;
    let pools = setup_thread_pools(doc, backend)?;
    let global_pattern = optional::<String>(doc, names::GLOBAL_PATTERN)?;

    let inputs = LoggerInputs {
        sinks: &sinks,
        patterns: &patterns,
        pools: &pools,
        global_pattern: global_pattern.as_deref(),
    };
    let loggers = build_loggers(doc, &inputs, backend)?;

    lgs_info!(
        conf,
        sinks = sinks.len(),
        patterns = patterns.len(),
        thread_pools = pools.len(),
        loggers,
        "logging set up"
    );
    Ok(())
}

/// Merge `overlay` onto a copy of `base`, then build the result.
pub fn build_from_document_with_override<B: LogBackend>(
    base: &Table,
    overlay: &Table,
    backend: &mut B,
) -> SetupResult<()> {
    let mut merged = base.clone();
    merge_documents(&mut merged, overlay)?;
    build_from_document(&merged, backend)
}

pub fn build_from_text<B: LogBackend>(text: &str, backend: &mut B) -> SetupResult<()> {
    let doc = parse_document(text)?;
    build_from_document(&doc, backend)
}

/// Substitute `{{ key }}` tags in `template` with `vars`, then parse and
/// build the resulting document.
pub fn build_from_text_with_substitution<B: LogBackend>(
    template: &str,
    vars: &HashMap<String, String>,
    backend: &mut B,
) -> SetupResult<()> {
    build_from_text(&render(template, vars), backend)
}
