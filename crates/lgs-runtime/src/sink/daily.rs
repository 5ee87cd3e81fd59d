use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use lgs_config::{Level, SetupError, SetupResult};
use parking_lot::Mutex;

use super::Sink;
use super::file::open_log_file;
use crate::pattern::FormattedLine;
use crate::record::{AtomicLevel, Record};

/// File for `date`: `log/daily.log` becomes `log/daily_2024-03-01.log`.
pub fn daily_filename(base: &Path, date: NaiveDate) -> PathBuf {
    let stem = base.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
    let day = format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day());
    let name = match base.extension() {
        Some(ext) => format!("{stem}_{day}.{}", ext.to_string_lossy()),
        None => format!("{stem}_{day}"),
    };
    base.with_file_name(name)
}

/// First `hour:minute` strictly after `now`.
pub fn next_rotation(now: NaiveDateTime, at: NaiveTime) -> NaiveDateTime {
    let today = now.date().and_time(at);
    if today > now {
        today
    } else {
        today + TimeDelta::days(1)
    }
}

struct State {
    writer: BufWriter<File>,
    path: PathBuf,
    rotate_at: NaiveDateTime,
}

/// Starts a new dated file every day at a fixed local time.
pub struct DailyFileSink {
    base: PathBuf,
    at: NaiveTime,
    state: Mutex<State>,
    level: AtomicLevel,
}

impl DailyFileSink {
    pub fn new(base: &Path, rotation_hour: u32, rotation_minute: u32) -> SetupResult<Self> {
        let at = NaiveTime::from_hms_opt(rotation_hour, rotation_minute, 0).ok_or_else(|| {
            SetupError::new(format!(
                "Invalid rotation time {rotation_hour:02}:{rotation_minute:02} for daily file sink"
            ))
        })?;
        let now = Local::now().naive_local();
        let path = daily_filename(base, now.date());
        let file = open_log_file(&path, false)?;
        Ok(Self {
            base: base.to_path_buf(),
            at,
            state: Mutex::new(State {
                writer: BufWriter::new(file),
                path,
                rotate_at: next_rotation(now, at),
            }),
            level: AtomicLevel::new(Level::Trace),
        })
    }

    /// Path of the file currently written to.
    pub fn current_filename(&self) -> PathBuf {
        self.state.lock().path.clone()
    }
}

impl Sink for DailyFileSink {
    fn log(&self, record: &Record, line: &FormattedLine) -> io::Result<()> {
        let mut state = self.state.lock();
        let now = record.time.naive_local();
        if now >= state.rotate_at {
            state.writer.flush()?;
            let path = daily_filename(&self.base, now.date());
            let file = File::options().append(true).create(true).open(&path)?;
            state.writer = BufWriter::new(file);
            state.path = path;
            state.rotate_at = next_rotation(now, self.at);
        }
        state.writer.write_all(line.text.as_bytes())
    }

    fn flush(&self) -> io::Result<()> {
        self.state.lock().writer.flush()
    }

    fn level(&self) -> &AtomicLevel {
        &self.level
    }

    fn kind(&self) -> &'static str {
        "daily_file"
    }
}

impl Drop for DailyFileSink {
    fn drop(&mut self) {
        let _ = self.state.get_mut().writer.flush();
    }
}
