use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use lgs_config::{Level, ResultExt, SetupResult};
use parking_lot::Mutex;

use super::Sink;
use crate::pattern::FormattedLine;
use crate::record::{AtomicLevel, Record};

/// Appends every line to one file.
#[derive(Debug)]
pub struct BasicFileSink {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
    level: AtomicLevel,
}

impl BasicFileSink {
    /// Open `path`, truncating it first when `truncate` is set. The parent
    /// directory must already exist.
    pub fn new(path: &Path, truncate: bool) -> SetupResult<Self> {
        let file = open_log_file(path, truncate)?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: Mutex::new(BufWriter::new(file)),
            level: AtomicLevel::new(Level::Trace),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

pub(super) fn open_log_file(path: &Path, truncate: bool) -> SetupResult<File> {
    let mut opts = OpenOptions::new();
    if truncate {
        opts.write(true).create(true).truncate(true);
    } else {
        opts.append(true).create(true);
    }
    opts.open(path)
        .with_setup_context(|| format!("Failed opening file '{}' for writing", path.display()))
}

impl Sink for BasicFileSink {
    fn log(&self, _record: &Record, line: &FormattedLine) -> io::Result<()> {
        self.writer.lock().write_all(line.text.as_bytes())
    }

    fn flush(&self) -> io::Result<()> {
        self.writer.lock().flush()
    }

    fn level(&self) -> &AtomicLevel {
        &self.level
    }

    fn kind(&self) -> &'static str {
        "basic_file"
    }
}

impl Drop for BasicFileSink {
    fn drop(&mut self) {
        let _ = self.writer.get_mut().flush();
    }
}
