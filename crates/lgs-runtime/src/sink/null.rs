use std::io;

use lgs_config::Level;

use super::Sink;
use crate::pattern::FormattedLine;
use crate::record::{AtomicLevel, Record};

/// Discards everything.
#[derive(Debug)]
pub struct NullSink {
    level: AtomicLevel,
}

impl NullSink {
    pub fn new() -> Self {
        Self {
            level: AtomicLevel::new(Level::Trace),
        }
    }
}

impl Default for NullSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for NullSink {
    fn log(&self, _record: &Record, _line: &FormattedLine) -> io::Result<()> {
        Ok(())
    }

    fn flush(&self) -> io::Result<()> {
        Ok(())
    }

    fn level(&self) -> &AtomicLevel {
        &self.level
    }

    fn kind(&self) -> &'static str {
        "null"
    }
}
