use std::sync::Arc;

use lgs_config::{Level, SetupResult};
use lgs_core::{LogBackend, LoggerMode, PoolRef, SinkKind, ThreadPoolSpec};

use crate::logger::Logger;
use crate::pool::ThreadPool;
use crate::registry;
use crate::sink::{
    BasicFileSink, ConsoleSink, ConsoleTarget, DailyFileSink, DistSink, NullSink,
    RotatingFileSink, SinkRef, SyslogSink,
};

/// [`LogBackend`] over the real engine: builds sinks, pools and loggers
/// and registers loggers in the process-wide [`registry`].
///
/// Sinks built by one backend are kept by name, so callers can inspect the
/// graph a document produced.
#[derive(Default)]
pub struct EngineBackend {
    sinks: Vec<(String, SinkRef)>,
}

impl EngineBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// The sink built for declaration `name`.
    pub fn sink(&self, name: &str) -> Option<&SinkRef> {
        self.sinks.iter().find(|(n, _)| n == name).map(|(_, s)| s)
    }

    /// Declaration names of the sinks `name` forwards to, matched by
    /// identity against the sinks this backend built.
    pub fn forward_names(&self, name: &str) -> Vec<&str> {
        let Some(sink) = self.sink(name) else {
            return Vec::new();
        };
        sink.forwards()
            .iter()
            .filter_map(|target| {
                self.sinks
                    .iter()
                    .find(|(_, s)| Arc::ptr_eq(s, target))
                    .map(|(n, _)| n.as_str())
            })
            .collect()
    }
}

impl LogBackend for EngineBackend {
    type Sink = SinkRef;
    type Pool = Arc<ThreadPool>;
    type Logger = Logger;

    fn create_sink(&mut self, name: &str, kind: &SinkKind, forwards: Vec<SinkRef>) -> SetupResult<SinkRef> {
        let sink: SinkRef = match kind {
            SinkKind::Stdout => Arc::new(ConsoleSink::new(ConsoleTarget::Stdout, false)),
            SinkKind::Stderr => Arc::new(ConsoleSink::new(ConsoleTarget::Stderr, false)),
            SinkKind::ColorStdout => Arc::new(ConsoleSink::new(ConsoleTarget::Stdout, true)),
            SinkKind::ColorStderr => Arc::new(ConsoleSink::new(ConsoleTarget::Stderr, true)),
            SinkKind::Msvc => Arc::new(ConsoleSink::debug_output()),
            SinkKind::Null => Arc::new(NullSink::new()),
            SinkKind::BasicFile { filename, truncate } => {
                Arc::new(BasicFileSink::new(filename, *truncate)?)
            }
            SinkKind::RotatingFile {
                base_filename,
                max_size,
                max_files,
            } => Arc::new(RotatingFileSink::new(base_filename, *max_size, *max_files)?),
            SinkKind::DailyFile {
                base_filename,
                rotation_hour,
                rotation_minute,
            } => Arc::new(DailyFileSink::new(base_filename, *rotation_hour, *rotation_minute)?),
            SinkKind::Syslog {
                ident,
                option,
                facility,
            } => Arc::new(SyslogSink::new(ident, *option, *facility)),
            SinkKind::Dist { .. } => Arc::new(DistSink::new(forwards)),
        };
        self.sinks.push((name.to_string(), Arc::clone(&sink)));
        Ok(sink)
    }

    fn set_sink_level(&mut self, sink: &SinkRef, level: Level) {
        sink.set_level(level);
    }

    fn set_global_thread_pool(&mut self, spec: &ThreadPoolSpec) -> SetupResult<()> {
        let pool = ThreadPool::new(spec.queue_size, spec.num_threads)?;
        registry::set_global_thread_pool(Arc::new(pool));
        Ok(())
    }

    fn create_thread_pool(&mut self, spec: &ThreadPoolSpec) -> SetupResult<Arc<ThreadPool>> {
        Ok(Arc::new(ThreadPool::new(spec.queue_size, spec.num_threads)?))
    }

    fn create_logger(
        &mut self,
        name: &str,
        sinks: Vec<SinkRef>,
        mode: LoggerMode<Arc<ThreadPool>>,
    ) -> SetupResult<Logger> {
        let logger = match mode {
            LoggerMode::Sync => Logger::new(name, sinks),
            LoggerMode::Async { pool, policy } => {
                let pool = match pool {
                    PoolRef::Named(pool) => pool,
                    PoolRef::Global => registry::global_thread_pool()?,
                };
                Logger::new_async(name, sinks, pool, policy)
            }
        };
        Ok(logger)
    }

    fn set_logger_level(&mut self, logger: &Logger, level: Level) {
        logger.set_level(level);
    }

    fn set_pattern(&mut self, logger: &Logger, pattern: &str) -> SetupResult<()> {
        logger.set_pattern(pattern)
    }

    fn register(&mut self, logger: Logger) -> SetupResult<()> {
        registry::register(Arc::new(logger));
        Ok(())
    }
}
