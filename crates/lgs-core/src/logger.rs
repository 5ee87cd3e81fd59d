//! Logger construction from `[[logger]]` declarations.
//!
//! Each declaration moves through the same steps: sinks resolved, pool
//! resolved (async only), logger created, level applied, pattern applied,
//! registered. The first failing step aborts that logger only; loggers
//! registered before it stay registered.

use std::collections::HashMap;

use lgs_config::doc::{entry_name, optional, string_array, table_array};
use lgs_config::{Level, ResultExt, SetupError, SetupResult, Table, names, setup_bail};

use crate::backend::{LogBackend, LoggerKind, LoggerMode, OverflowPolicy, PoolRef};
use crate::pattern::PatternTable;
use crate::sink::SinkTable;

/// Everything a logger declaration may refer to.
pub struct LoggerInputs<'a, B: LogBackend> {
    pub sinks: &'a SinkTable<B::Sink>,
    pub patterns: &'a PatternTable,
    pub pools: &'a HashMap<String, B::Pool>,
    pub global_pattern: Option<&'a str>,
}

/// Build and register every logger in the document. Returns the number of
/// loggers registered.
pub fn build_loggers<B: LogBackend>(
    doc: &Table,
    inputs: &LoggerInputs<'_, B>,
    backend: &mut B,
) -> SetupResult<usize> {
    let Some(entries) = table_array(doc, names::LOGGER_TABLE)? else {
        setup_bail!("No loggers configured for set-up");
    };

    for entry in &entries {
        let Some(name) = entry_name(entry) else {
            setup_bail!("One of the loggers does not have a '{}' field", names::NAME);
        };
        let logger = build_logger(name, entry, inputs, backend)?;
        backend.register(logger)?;
        lgs_debug!(logger, logger = name, "logger registered");
    }
    Ok(entries.len())
}

fn build_logger<B: LogBackend>(
    name: &str,
    entry: &Table,
    inputs: &LoggerInputs<'_, B>,
    backend: &mut B,
) -> SetupResult<B::Logger> {
    let kind = match optional::<String>(entry, names::TYPE)? {
        Some(ty) => ty.parse::<LoggerKind>().with_setup_context(|| logger_context(name))?,
        None => LoggerKind::Sync,
    };

    let sink_names = string_array(entry, names::SINKS, || {
        format!(
            "Logger '{name}' does not have a '{}' field of sink names",
            names::SINKS
        )
    })?;
    let mut sinks = Vec::with_capacity(sink_names.len());
    for sink_name in &sink_names {
        let Some(sink) = inputs.sinks.get(sink_name) else {
            setup_bail!("Unable to find sink '{sink_name}' for logger '{name}'");
        };
        sinks.push(sink.clone());
    }

    let mode = match kind {
        LoggerKind::Sync => LoggerMode::Sync,
        LoggerKind::Async => {
            let pool = match optional::<String>(entry, names::THREAD_POOL)? {
                Some(pool_name) => match inputs.pools.get(&pool_name) {
                    Some(pool) => PoolRef::Named(pool.clone()),
                    None => setup_bail!(
                        "Unable to find thread pool '{pool_name}' for logger '{name}'"
                    ),
                },
                None => PoolRef::Global,
            };
            let policy = match optional::<String>(entry, names::OVERFLOW_POLICY)? {
                Some(p) => p
                    .parse::<OverflowPolicy>()
                    .with_setup_context(|| logger_context(name))?,
                None => OverflowPolicy::Block,
            };
            LoggerMode::Async { pool, policy }
        }
    };

    // An explicit pattern name wins over `global_pattern`.
    let pattern = match optional::<String>(entry, names::PATTERN)? {
        Some(pattern_name) => match inputs.patterns.get(&pattern_name) {
            Some(value) => Some(value),
            None => setup_bail!("Pattern name '{pattern_name}' cannot be found for logger '{name}'"),
        },
        None => inputs.global_pattern,
    };
    let level = match optional::<String>(entry, names::LEVEL)? {
        Some(level) => Some(
            level
                .parse::<Level>()
                .with_setup_context(|| logger_context(name))?,
        ),
        None => None,
    };

    let logger = backend.create_logger(name, sinks, mode)?;
    if let Some(level) = level {
        backend.set_logger_level(&logger, level);
    }
    if let Some(pattern) = pattern {
        backend.set_pattern(&logger, pattern).map_err(|e| {
            SetupError::new(format!(
                "Error setting pattern to logger '{name}': {}",
                e.message()
            ))
        })?;
    }

    Ok(logger)
}

fn logger_context(name: &str) -> String {
    format!("Logger '{name}' error")
}
