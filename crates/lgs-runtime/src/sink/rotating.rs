use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use lgs_config::{Level, SetupResult, setup_bail};
use parking_lot::Mutex;

use super::Sink;
use super::file::open_log_file;
use crate::pattern::FormattedLine;
use crate::record::{AtomicLevel, Record};

/// Name of the `index`-th rotated file: `log/app.log` becomes
/// `log/app.1.log`, `log/app.2.log`, … Index 0 is the live file.
pub fn rotated_filename(base: &Path, index: usize) -> PathBuf {
    if index == 0 {
        return base.to_path_buf();
    }
    let stem = base.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
    let name = match base.extension() {
        Some(ext) => format!("{stem}.{index}.{}", ext.to_string_lossy()),
        None => format!("{stem}.{index}"),
    };
    base.with_file_name(name)
}

struct State {
    writer: BufWriter<File>,
    size: u64,
}

/// Size-bounded file sink keeping at most `max_files` rotated copies.
pub struct RotatingFileSink {
    base: PathBuf,
    max_size: u64,
    max_files: usize,
    state: Mutex<State>,
    level: AtomicLevel,
}

impl RotatingFileSink {
    pub fn new(base: &Path, max_size: u64, max_files: usize) -> SetupResult<Self> {
        if max_size == 0 {
            setup_bail!("Rotating file sink '{}' needs a max_size above 0", base.display());
        }
        let file = open_log_file(base, false)?;
        let size = file.metadata().map(|m| m.len()).unwrap_or(0);
        Ok(Self {
            base: base.to_path_buf(),
            max_size,
            max_files,
            state: Mutex::new(State {
                writer: BufWriter::new(file),
                size,
            }),
            level: AtomicLevel::new(Level::Trace),
        })
    }

    /// Shift `base.N-1` to `base.N` down to the live file, then start a new
    /// empty live file. The oldest copy falls off the end.
    fn rotate(&self, state: &mut State) -> io::Result<()> {
        state.writer.flush()?;
        for i in (1..=self.max_files).rev() {
            let src = rotated_filename(&self.base, i - 1);
            if !src.exists() {
                continue;
            }
            let dst = rotated_filename(&self.base, i);
            if dst.exists() {
                fs::remove_file(&dst)?;
            }
            fs::rename(&src, &dst)?;
        }
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.base)?;
        state.writer = BufWriter::new(file);
        state.size = 0;
        Ok(())
    }
}

impl Sink for RotatingFileSink {
    fn log(&self, _record: &Record, line: &FormattedLine) -> io::Result<()> {
        let mut state = self.state.lock();
        let len = line.text.len() as u64;
        if state.size > 0 && state.size + len > self.max_size {
            self.rotate(&mut state)?;
        }
        state.writer.write_all(line.text.as_bytes())?;
        state.size += len;
        Ok(())
    }

    fn flush(&self) -> io::Result<()> {
        self.state.lock().writer.flush()
    }

    fn level(&self) -> &AtomicLevel {
        &self.level
    }

    fn kind(&self) -> &'static str {
        "rotating_file"
    }
}

impl Drop for RotatingFileSink {
    fn drop(&mut self) {
        let _ = self.state.get_mut().writer.flush();
    }
}
