//! Table and field names recognized in a configuration document.

// tables
pub const SINK_TABLE: &str = "sink";
pub const PATTERN_TABLE: &str = "pattern";
pub const LOGGER_TABLE: &str = "logger";
pub const THREAD_POOL_TABLE: &str = "thread_pool";
pub const GLOBAL_THREAD_POOL_TABLE: &str = "global_thread_pool";

// fields
pub const BASE_FILENAME: &str = "base_filename";
pub const CREATE_PARENT_DIR: &str = "create_parent_dir";
pub const FILENAME: &str = "filename";
pub const GLOBAL_PATTERN: &str = "global_pattern";
pub const IDENT: &str = "ident";
pub const LEVEL: &str = "level";
pub const MAX_FILES: &str = "max_files";
pub const MAX_SIZE: &str = "max_size";
pub const NAME: &str = "name";
pub const NUM_THREADS: &str = "num_threads";
pub const OVERFLOW_POLICY: &str = "overflow_policy";
pub const PATTERN: &str = "pattern";
pub const QUEUE_SIZE: &str = "queue_size";
pub const ROTATION_HOUR: &str = "rotation_hour";
pub const ROTATION_MINUTE: &str = "rotation_minute";
pub const SINKS: &str = "sinks";
pub const SYSLOG_FACILITY: &str = "syslog_facility";
pub const SYSLOG_OPTION: &str = "syslog_option";
pub const THREAD_POOL: &str = "thread_pool";
pub const TRUNCATE: &str = "truncate";
pub const TYPE: &str = "type";
pub const VALUE: &str = "value";

// logger types and overflow policies
pub const SYNC: &str = "sync";
pub const ASYNC: &str = "async";
pub const BLOCK: &str = "block";
pub const OVERRUN_OLDEST: &str = "overrun_oldest";
