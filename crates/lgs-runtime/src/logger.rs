use std::sync::Arc;
use std::sync::mpsc;

use lgs_config::{Level, SetupResult};
use lgs_core::OverflowPolicy;
use parking_lot::RwLock;

use crate::pattern::PatternFormatter;
use crate::pool::ThreadPool;
use crate::record::{AtomicLevel, Record};
use crate::sink::{SinkRef, write_all};

/// Threshold of a logger whose document sets no level.
pub const DEFAULT_LEVEL: Level = Level::Info;

/// The part of a logger that worker threads need.
struct Core {
    sinks: Vec<SinkRef>,
    formatter: RwLock<PatternFormatter>,
}

impl Core {
    fn write(&self, record: &Record) {
        let line = self.formatter.read().format(record);
        // failures are already reported per sink
        let _ = write_all(&self.sinks, record, &line);
    }

    fn flush(&self) {
        for sink in &self.sinks {
            if let Err(e) = sink.flush() {
                lgs_warn!(sink, sink = sink.kind(), error = %e, "sink flush failed");
            }
        }
    }
}

enum Dispatch {
    Sync,
    Async {
        pool: Arc<ThreadPool>,
        policy: OverflowPolicy,
    },
}

/// A named entry point that filters, formats and writes records to its
/// sinks, either on the calling thread or through a worker pool.
pub struct Logger {
    name: String,
    level: AtomicLevel,
    core: Arc<Core>,
    dispatch: Dispatch,
}

impl Logger {
    pub fn new(name: &str, sinks: Vec<SinkRef>) -> Self {
        Self::with_dispatch(name, sinks, Dispatch::Sync)
    }

    /// An async logger bound to `pool` for its whole lifetime.
    pub fn new_async(name: &str, sinks: Vec<SinkRef>, pool: Arc<ThreadPool>, policy: OverflowPolicy) -> Self {
        Self::with_dispatch(name, sinks, Dispatch::Async { pool, policy })
    }

    fn with_dispatch(name: &str, sinks: Vec<SinkRef>, dispatch: Dispatch) -> Self {
        Self {
            name: name.to_string(),
            level: AtomicLevel::new(DEFAULT_LEVEL),
            core: Arc::new(Core {
                sinks,
                formatter: RwLock::new(PatternFormatter::default()),
            }),
            dispatch,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> Level {
        self.level.get()
    }

    pub fn set_level(&self, level: Level) {
        self.level.set(level);
    }

    pub fn should_log(&self, level: Level) -> bool {
        self.level.allows(level)
    }

    pub fn sinks(&self) -> &[SinkRef] {
        &self.core.sinks
    }

    pub fn pattern(&self) -> String {
        self.core.formatter.read().pattern().to_string()
    }

    /// Replace the format string; a malformed pattern leaves the current one.
    pub fn set_pattern(&self, pattern: &str) -> SetupResult<()> {
        let formatter = PatternFormatter::new(pattern)?;
        *self.core.formatter.write() = formatter;
        Ok(())
    }

    /// The pool an async logger is bound to.
    pub fn thread_pool(&self) -> Option<&Arc<ThreadPool>> {
        match &self.dispatch {
            Dispatch::Sync => None,
            Dispatch::Async { pool, .. } => Some(pool),
        }
    }

    pub fn overflow_policy(&self) -> Option<OverflowPolicy> {
        match &self.dispatch {
            Dispatch::Sync => None,
            Dispatch::Async { policy, .. } => Some(*policy),
        }
    }

    pub fn log(&self, level: Level, message: impl Into<String>) {
        if !self.should_log(level) {
            return;
        }
        let record = Record::new(&self.name, level, message);
        match &self.dispatch {
            Dispatch::Sync => self.core.write(&record),
            Dispatch::Async { pool, policy } => {
                let core = Arc::clone(&self.core);
                pool.post(Box::new(move || core.write(&record)), *policy);
            }
        }
    }

    pub fn trace(&self, message: impl Into<String>) {
        self.log(Level::Trace, message);
    }

    pub fn debug(&self, message: impl Into<String>) {
        self.log(Level::Debug, message);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(Level::Info, message);
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.log(Level::Warn, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.log(Level::Err, message);
    }

    pub fn critical(&self, message: impl Into<String>) {
        self.log(Level::Critical, message);
    }

    /// Flush every sink. For an async logger this waits until the records
    /// queued before the call have been written.
    pub fn flush(&self) {
        match &self.dispatch {
            Dispatch::Sync => self.core.flush(),
            Dispatch::Async { pool, .. } => {
                let core = Arc::clone(&self.core);
                let (tx, rx) = mpsc::channel();
                pool.post(
                    Box::new(move || {
                        core.flush();
                        let _ = tx.send(());
                    }),
                    OverflowPolicy::Block,
                );
                let _ = rx.recv();
            }
        }
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("level", &self.level())
            .field("sinks", &self.core.sinks.len())
            .field("async", &self.thread_pool().is_some())
            .finish()
    }
}
