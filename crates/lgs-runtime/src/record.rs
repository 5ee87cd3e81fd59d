use std::sync::atomic::{AtomicU8, Ordering};

use chrono::{DateTime, Local};
use lgs_config::Level;

/// One log call, captured on the calling thread.
#[derive(Debug, Clone)]
pub struct Record {
    pub logger: String,
    pub level: Level,
    pub time: DateTime<Local>,
    pub thread_id: u64,
    pub payload: String,
}

impl Record {
    pub fn new(logger: &str, level: Level, payload: impl Into<String>) -> Self {
        Self {
            logger: logger.to_string(),
            level,
            time: Local::now(),
            thread_id: current_thread_id(),
            payload: payload.into(),
        }
    }
}

/// Numeric id of the calling thread, stable for the thread's lifetime.
pub fn current_thread_id() -> u64 {
    use std::sync::atomic::AtomicU64;

    static NEXT: AtomicU64 = AtomicU64::new(1);
    thread_local! {
        static ID: u64 = NEXT.fetch_add(1, Ordering::Relaxed);
    }
    ID.with(|id| *id)
}

/// A severity threshold that can be changed through a shared reference.
#[derive(Debug)]
pub struct AtomicLevel(AtomicU8);

impl AtomicLevel {
    pub fn new(level: Level) -> Self {
        Self(AtomicU8::new(level.as_u8()))
    }

    pub fn get(&self) -> Level {
        Level::from_u8(self.0.load(Ordering::Relaxed))
    }

    pub fn set(&self, level: Level) {
        self.0.store(level.as_u8(), Ordering::Relaxed);
    }

    /// Whether a message at `level` passes this threshold.
    pub fn allows(&self, level: Level) -> bool {
        level != Level::Off && level >= self.get()
    }
}
