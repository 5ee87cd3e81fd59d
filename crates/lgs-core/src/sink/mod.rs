//! Sink declarations and their depth-first resolution.

mod kind;
mod resolve;

pub use kind::{DEFAULT_SYSLOG_FACILITY, SinkKind, SinkType};
pub use resolve::{SinkTable, resolve_sinks};
