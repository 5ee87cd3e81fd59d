#[macro_use]
extern crate lgs_config;

pub mod backend;
pub mod bridge;
pub mod logger;
pub mod pattern;
pub mod pool;
pub mod record;
pub mod registry;
pub mod setup;
pub mod sink;

pub use backend::EngineBackend;
pub use bridge::{LoggerLayer, init_bridge, init_bridge_for};
pub use logger::Logger;
pub use pattern::{DEFAULT_PATTERN, PatternFormatter};
pub use pool::ThreadPool;
pub use setup::{
    delete_logger_in_file, from_file, from_file_and_override_with_tag_replacement,
    from_file_with_override, from_file_with_tag_replacement, from_str, save_logger_to_file,
};
pub use sink::{Sink, SinkRef};
