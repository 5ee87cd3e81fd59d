//! Recording [`LogBackend`] used by the unit tests.
//!
//! Handles are indices into the recorded objects, so tests can inspect what
//! the compiler asked for: which sinks were created and how often, what each
//! aggregating sink forwards to, which loggers were registered with which
//! pool, level and pattern.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use lgs_config::{Level, SetupResult, setup_bail};

use crate::backend::{LogBackend, LoggerMode, PoolRef, ThreadPoolSpec};
use crate::sink::SinkKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoggerId(usize);

#[derive(Debug, Clone, PartialEq)]
pub struct SinkRecord {
    pub name: String,
    pub kind: SinkKind,
    pub forwards: Vec<SinkId>,
    pub level: Option<Level>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoggerRecord {
    pub name: String,
    pub sinks: Vec<SinkId>,
    pub mode: LoggerMode<PoolId>,
    pub level: Option<Level>,
    pub pattern: Option<String>,
}

#[derive(Debug, Default)]
pub struct FakeBackend {
    pub sinks: Vec<SinkRecord>,
    pub pools: Vec<ThreadPoolSpec>,
    pub global_pools: Vec<ThreadPoolSpec>,
    pub loggers: Vec<LoggerRecord>,
    pub registered: Vec<LoggerId>,
    pub dirs: Vec<PathBuf>,
    /// `create_dir_all` fails for these paths.
    pub failing_dirs: HashSet<PathBuf>,
    /// `set_pattern` rejects these format strings.
    pub bad_patterns: HashSet<String>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sink(&self, name: &str) -> Option<&SinkRecord> {
        self.sinks.iter().find(|s| s.name == name)
    }

    pub fn sink_id(&self, name: &str) -> Option<SinkId> {
        self.sinks.iter().position(|s| s.name == name).map(SinkId)
    }

    pub fn times_created(&self, name: &str) -> usize {
        self.sinks.iter().filter(|s| s.name == name).count()
    }

    /// Names an aggregating sink forwards to, in order.
    pub fn forward_names(&self, name: &str) -> Vec<&str> {
        self.sink(name)
            .map(|s| s.forwards.iter().map(|id| self.sinks[id.0].name.as_str()).collect())
            .unwrap_or_default()
    }

    /// Registered loggers, in registration order.
    pub fn registered(&self) -> Vec<&LoggerRecord> {
        self.registered.iter().map(|id| &self.loggers[id.0]).collect()
    }

    pub fn registered_names(&self) -> Vec<&str> {
        self.registered().into_iter().map(|l| l.name.as_str()).collect()
    }

    pub fn logger(&self, name: &str) -> Option<&LoggerRecord> {
        self.registered().into_iter().rev().find(|l| l.name == name)
    }

    pub fn logger_sink_names(&self, name: &str) -> Vec<&str> {
        self.logger(name)
            .map(|l| l.sinks.iter().map(|id| self.sinks[id.0].name.as_str()).collect())
            .unwrap_or_default()
    }

    pub fn pool(&self, id: PoolId) -> &ThreadPoolSpec {
        &self.pools[id.0]
    }

    /// Name of the pool an async logger is bound to; `None` for the global
    /// pool or a sync logger.
    pub fn logger_pool_name(&self, name: &str) -> Option<&str> {
        match &self.logger(name)?.mode {
            LoggerMode::Async {
                pool: PoolRef::Named(id),
                ..
            } => self.pool(*id).name.as_deref(),
            _ => None,
        }
    }
}

impl LogBackend for FakeBackend {
    type Sink = SinkId;
    type Pool = PoolId;
    type Logger = LoggerId;

    fn create_dir_all(&mut self, path: &Path) -> SetupResult<()> {
        if self.failing_dirs.contains(path) {
            setup_bail!("Unable to create directory at '{}'", path.display());
        }
        self.dirs.push(path.to_path_buf());
        Ok(())
    }

    fn create_sink(&mut self, name: &str, kind: &SinkKind, forwards: Vec<SinkId>) -> SetupResult<SinkId> {
        self.sinks.push(SinkRecord {
            name: name.to_string(),
            kind: kind.clone(),
            forwards,
            level: None,
        });
        Ok(SinkId(self.sinks.len() - 1))
    }

    fn set_sink_level(&mut self, sink: &SinkId, level: Level) {
        self.sinks[sink.0].level = Some(level);
    }

    fn set_global_thread_pool(&mut self, spec: &ThreadPoolSpec) -> SetupResult<()> {
        self.global_pools.push(spec.clone());
        Ok(())
    }

    fn create_thread_pool(&mut self, spec: &ThreadPoolSpec) -> SetupResult<PoolId> {
        self.pools.push(spec.clone());
        Ok(PoolId(self.pools.len() - 1))
    }

    fn create_logger(
        &mut self,
        name: &str,
        sinks: Vec<SinkId>,
        mode: LoggerMode<PoolId>,
    ) -> SetupResult<LoggerId> {
        self.loggers.push(LoggerRecord {
            name: name.to_string(),
            sinks,
            mode,
            level: None,
            pattern: None,
        });
        Ok(LoggerId(self.loggers.len() - 1))
    }

    fn set_logger_level(&mut self, logger: &LoggerId, level: Level) {
        self.loggers[logger.0].level = Some(level);
    }

    fn set_pattern(&mut self, logger: &LoggerId, pattern: &str) -> SetupResult<()> {
        if self.bad_patterns.contains(pattern) {
            setup_bail!("Malformed pattern '{pattern}'");
        }
        self.loggers[logger.0].pattern = Some(pattern.to_string());
        Ok(())
    }

    fn register(&mut self, logger: LoggerId) -> SetupResult<()> {
        self.registered.push(logger);
        Ok(())
    }
}
