//! Process-wide logger table and default worker pool.
//!
//! Configuration loads are expected to be serialized by the caller; the
//! locks here only make individual lookups and replacements safe.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use lgs_config::SetupResult;
use parking_lot::RwLock;

use crate::logger::Logger;
use crate::pool::ThreadPool;

struct Registry {
    loggers: RwLock<HashMap<String, Arc<Logger>>>,
    global_pool: RwLock<Option<Arc<ThreadPool>>>,
}

static REGISTRY: LazyLock<Registry> = LazyLock::new(|| Registry {
    loggers: RwLock::new(HashMap::new()),
    global_pool: RwLock::new(None),
});

pub fn get(name: &str) -> Option<Arc<Logger>> {
    REGISTRY.loggers.read().get(name).cloned()
}

/// Register `logger` under its name, replacing and returning any logger
/// previously registered under the same name.
pub fn register(logger: Arc<Logger>) -> Option<Arc<Logger>> {
    let name = logger.name().to_string();
    let previous = REGISTRY.loggers.write().insert(name.clone(), logger);
    if previous.is_some() {
        lgs_debug!(logger, logger = %name, "replaced registered logger");
    }
    previous
}

/// Unregister `name`. Holders of the returned handle can keep logging.
pub fn drop_logger(name: &str) -> Option<Arc<Logger>> {
    REGISTRY.loggers.write().remove(name)
}

/// Registered names, sorted.
pub fn logger_names() -> Vec<String> {
    let mut names: Vec<String> = REGISTRY.loggers.read().keys().cloned().collect();
    names.sort();
    names
}

pub fn flush_all() {
    let loggers: Vec<Arc<Logger>> = REGISTRY.loggers.read().values().cloned().collect();
    for logger in loggers {
        logger.flush();
    }
}

/// The current global pool, created with default dimensions on first use.
pub fn global_thread_pool() -> SetupResult<Arc<ThreadPool>> {
    if let Some(pool) = REGISTRY.global_pool.read().as_ref() {
        return Ok(Arc::clone(pool));
    }
    let mut slot = REGISTRY.global_pool.write();
    if let Some(pool) = slot.as_ref() {
        return Ok(Arc::clone(pool));
    }
    let pool = Arc::new(ThreadPool::with_defaults()?);
    *slot = Some(Arc::clone(&pool));
    Ok(pool)
}

/// Replace the global pool. Loggers already bound to the previous pool keep
/// it alive and keep using it; the previous pool is returned.
pub fn set_global_thread_pool(pool: Arc<ThreadPool>) -> Option<Arc<ThreadPool>> {
    REGISTRY.global_pool.write().replace(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{BasicFileSink, SinkRef};

    #[test]
    fn register_replace_and_drop() {
        let first = Arc::new(Logger::new("reg_replace", Vec::new()));
        assert!(register(Arc::clone(&first)).is_none());
        assert!(logger_names().contains(&"reg_replace".to_string()));

        let second = Arc::new(Logger::new("reg_replace", Vec::new()));
        let previous = register(Arc::clone(&second)).unwrap();
        assert!(Arc::ptr_eq(&previous, &first));
        assert!(Arc::ptr_eq(&get("reg_replace").unwrap(), &second));

        let dropped = drop_logger("reg_replace").unwrap();
        assert!(Arc::ptr_eq(&dropped, &second));
        assert!(get("reg_replace").is_none());
        assert!(drop_logger("reg_replace").is_none());
        assert!(!logger_names().contains(&"reg_replace".to_string()));
    }

    #[test]
    fn flush_all_reaches_registered_sinks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flush.log");
        let sink: SinkRef = Arc::new(BasicFileSink::new(&path, true).unwrap());
        let logger = Arc::new(Logger::new("reg_flush", vec![sink]));
        logger.set_pattern("%v").unwrap();
        register(Arc::clone(&logger));

        logger.info("buffered");
        flush_all();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "buffered\n");
        drop_logger("reg_flush");
    }
}
