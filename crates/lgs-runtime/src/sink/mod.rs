//! Output destinations.
//!
//! Every sink is shared as a [`SinkRef`] and is safe to call from several
//! loggers and worker threads at once. The level threshold is the only
//! state that changes after construction.

use std::io;
use std::sync::Arc;

use lgs_config::Level;

use crate::pattern::FormattedLine;
use crate::record::{AtomicLevel, Record};

mod console;
mod daily;
mod dist;
mod file;
mod null;
mod rotating;
mod syslog;

pub use console::{ConsoleSink, ConsoleTarget};
pub use daily::{DailyFileSink, daily_filename, next_rotation};
pub use dist::DistSink;
pub use file::BasicFileSink;
pub use null::NullSink;
pub use rotating::{RotatingFileSink, rotated_filename};
pub use syslog::SyslogSink;

pub type SinkRef = Arc<dyn Sink>;

pub trait Sink: Send + Sync {
    /// Write one formatted record. Level filtering has already happened.
    fn log(&self, record: &Record, line: &FormattedLine) -> io::Result<()>;

    fn flush(&self) -> io::Result<()>;

    fn level(&self) -> &AtomicLevel;

    /// Short variant name, e.g. `basic_file`.
    fn kind(&self) -> &'static str;

    /// Targets of an aggregating sink.
    fn forwards(&self) -> &[SinkRef] {
        &[]
    }

    fn should_log(&self, level: Level) -> bool {
        self.level().allows(level)
    }

    fn set_level(&self, level: Level) {
        self.level().set(level);
    }
}

/// Write `line` to every sink of `sinks` whose threshold allows the record.
///
/// A failing sink does not stop the others; failures are reported through
/// `tracing` and the first one is returned.
pub(crate) fn write_all(sinks: &[SinkRef], record: &Record, line: &FormattedLine) -> io::Result<()> {
    let mut first_err = None;
    for sink in sinks {
        if !sink.should_log(record.level) {
            continue;
        }
        if let Err(e) = sink.log(record, line) {
            lgs_warn!(sink, sink = sink.kind(), logger = %record.logger, error = %e, "sink write failed");
            first_err.get_or_insert(e);
        }
    }
    first_err.map_or(Ok(()), Err)
}
