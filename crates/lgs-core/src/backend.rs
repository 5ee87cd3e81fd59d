//! The seam between the setup compiler and the logging engine.
//!
//! The compiler never touches process-wide state itself: every sink, pool
//! and logger is created through a [`LogBackend`], so the build can run
//! against the real engine or against a recording fake.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use lgs_config::{Level, ResultExt, SetupError, SetupResult, names};

use crate::sink::SinkKind;

// ---------------------------------------------------------------------------
// LoggerKind
// ---------------------------------------------------------------------------

/// Whether a logger writes on the caller's thread or hands records to a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoggerKind {
    #[default]
    Sync,
    Async,
}

impl FromStr for LoggerKind {
    type Err = SetupError;

    fn from_str(s: &str) -> SetupResult<Self> {
        match s {
            names::SYNC => Ok(Self::Sync),
            names::ASYNC => Ok(Self::Async),
            other => Err(SetupError::new(format!(
                "Invalid logger type '{other}', expected '{}' or '{}'",
                names::SYNC,
                names::ASYNC
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// OverflowPolicy
// ---------------------------------------------------------------------------

/// What an async logger does when its pool's queue is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Wait for room in the queue.
    #[default]
    Block,
    /// Drop the oldest queued message to make room.
    OverrunOldest,
}

impl FromStr for OverflowPolicy {
    type Err = SetupError;

    fn from_str(s: &str) -> SetupResult<Self> {
        match s {
            names::BLOCK => Ok(Self::Block),
            names::OVERRUN_OLDEST => Ok(Self::OverrunOldest),
            other => Err(SetupError::new(format!(
                "Invalid overflow policy '{other}', expected '{}' or '{}'",
                names::BLOCK,
                names::OVERRUN_OLDEST
            ))),
        }
    }
}

impl fmt::Display for OverflowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Block => f.write_str(names::BLOCK),
            Self::OverrunOldest => f.write_str(names::OVERRUN_OLDEST),
        }
    }
}

// ---------------------------------------------------------------------------
// Thread pools and logger modes
// ---------------------------------------------------------------------------

/// Worker pool dimensions, for both named pools and the global pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadPoolSpec {
    /// `None` for the global pool.
    pub name: Option<String>,
    pub queue_size: usize,
    pub num_threads: usize,
}

/// Which pool an async logger binds to.
#[derive(Debug, Clone, PartialEq)]
pub enum PoolRef<P> {
    /// The process-wide default pool at the time the logger is created.
    Global,
    Named(P),
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoggerMode<P> {
    Sync,
    Async {
        pool: PoolRef<P>,
        policy: OverflowPolicy,
    },
}

// ---------------------------------------------------------------------------
// LogBackend
// ---------------------------------------------------------------------------

/// Constructs and registers the objects described by a configuration
/// document.
///
/// Handles are cheap clones of shared objects: a sink referenced by several
/// loggers or aggregating sinks is created once and its handle cloned.
pub trait LogBackend {
    type Sink: Clone;
    type Pool: Clone;
    type Logger;

    /// Create `path` and any missing parents. Called before a file-backed
    /// sink with `create_parent_dir = true` is opened.
    fn create_dir_all(&mut self, path: &Path) -> SetupResult<()> {
        std::fs::create_dir_all(path)
            .with_setup_context(|| format!("Unable to create directory at '{}'", path.display()))
    }

    /// Build one sink. `forwards` holds the already-built targets of an
    /// aggregating sink, in declaration order, and is empty for leaf sinks.
    fn create_sink(
        &mut self,
        name: &str,
        kind: &SinkKind,
        forwards: Vec<Self::Sink>,
    ) -> SetupResult<Self::Sink>;

    fn set_sink_level(&mut self, sink: &Self::Sink, level: Level);

    /// Replace the process-wide default pool. Loggers already bound to the
    /// previous pool keep it.
    fn set_global_thread_pool(&mut self, spec: &ThreadPoolSpec) -> SetupResult<()>;

    fn create_thread_pool(&mut self, spec: &ThreadPoolSpec) -> SetupResult<Self::Pool>;

    fn create_logger(
        &mut self,
        name: &str,
        sinks: Vec<Self::Sink>,
        mode: LoggerMode<Self::Pool>,
    ) -> SetupResult<Self::Logger>;

    fn set_logger_level(&mut self, logger: &Self::Logger, level: Level);

    /// Apply a format string; a malformed pattern is an error.
    fn set_pattern(&mut self, logger: &Self::Logger, pattern: &str) -> SetupResult<()>;

    /// Make the logger available by name. Duplicate names are resolved by
    /// the backend.
    fn register(&mut self, logger: Self::Logger) -> SetupResult<()>;
}
