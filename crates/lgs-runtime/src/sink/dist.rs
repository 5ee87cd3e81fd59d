use std::io;

use lgs_config::Level;

use super::{Sink, SinkRef, write_all};
use crate::pattern::FormattedLine;
use crate::record::{AtomicLevel, Record};

/// Fans each record out to a fixed list of other sinks.
///
/// The record is passed on only if this sink's own threshold allows it;
/// each target then applies its own threshold.
pub struct DistSink {
    sinks: Vec<SinkRef>,
    level: AtomicLevel,
}

impl DistSink {
    pub fn new(sinks: Vec<SinkRef>) -> Self {
        Self {
            sinks,
            level: AtomicLevel::new(Level::Trace),
        }
    }
}

impl Sink for DistSink {
    fn log(&self, record: &Record, line: &FormattedLine) -> io::Result<()> {
        write_all(&self.sinks, record, line)
    }

    fn flush(&self) -> io::Result<()> {
        for sink in &self.sinks {
            sink.flush()?;
        }
        Ok(())
    }

    fn level(&self) -> &AtomicLevel {
        &self.level
    }

    fn kind(&self) -> &'static str {
        "dist"
    }

    fn forwards(&self) -> &[SinkRef] {
        &self.sinks
    }
}
