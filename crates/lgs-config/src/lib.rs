#[macro_use]
mod log_macros;

pub mod doc;
pub mod error;
pub mod merge;
pub mod names;
pub mod store;
pub mod template;
pub mod types;

pub use error::{ResultExt, SetupError, SetupResult};
pub use merge::merge_documents;
pub use store::{
    parse_document, read_document, read_text, remove_logger_entry, upsert_logger_level,
    write_document,
};
pub use template::render;
pub use types::{ByteSize, Level, parse_max_size};

pub use toml::Table;

#[doc(hidden)]
pub use tracing as __tracing;
