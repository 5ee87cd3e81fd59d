#[macro_use]
extern crate lgs_config;

pub mod backend;
pub mod logger;
pub mod pattern;
pub mod setup;
pub mod sink;
pub mod thread_pool;

#[cfg(test)]
pub(crate) mod testing;

pub use backend::{LogBackend, LoggerKind, LoggerMode, OverflowPolicy, PoolRef, ThreadPoolSpec};
pub use pattern::{PatternTable, build_patterns};
pub use setup::{
    build_from_document, build_from_document_with_override, build_from_text,
    build_from_text_with_substitution,
};
pub use sink::{SinkKind, SinkTable, SinkType, resolve_sinks};
pub use thread_pool::setup_thread_pools;
