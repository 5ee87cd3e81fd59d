use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use lgs_config::doc::{optional_or, required};
use lgs_config::{ByteSize, SetupError, SetupResult, Table, names, setup_bail};

// ---------------------------------------------------------------------------
// SinkType: closed set of recognized `type` strings
// ---------------------------------------------------------------------------

/// Sink variant selected by a declaration's `type` field.
///
/// Every variant is spelled with either an `_st` or an `_mt` suffix in the
/// document. Both select the same variant: all sinks built here are safe to
/// share across threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SinkType {
    Stdout,
    Stderr,
    ColorStdout,
    ColorStderr,
    BasicFile,
    RotatingFile,
    DailyFile,
    Null,
    Syslog,
    Dist,
    Msvc,
}

impl SinkType {
    /// Base name used in diagnostics, e.g. `rotating_file_sink`.
    pub fn family(&self) -> &'static str {
        match self {
            SinkType::Stdout => "stdout_sink",
            SinkType::Stderr => "stderr_sink",
            SinkType::ColorStdout => "color_stdout_sink",
            SinkType::ColorStderr => "color_stderr_sink",
            SinkType::BasicFile => "basic_file_sink",
            SinkType::RotatingFile => "rotating_file_sink",
            SinkType::DailyFile => "daily_file_sink",
            SinkType::Null => "null_sink",
            SinkType::Syslog => "syslog_sink",
            SinkType::Dist => "dist_sink",
            SinkType::Msvc => "msvc_sink",
        }
    }

    /// Aggregating sinks forward to other declared sinks by name.
    pub fn is_aggregating(&self) -> bool {
        matches!(self, SinkType::Dist)
    }
}

impl FromStr for SinkType {
    type Err = SetupError;

    fn from_str(s: &str) -> SetupResult<Self> {
        let family = s
            .strip_suffix("_st")
            .or_else(|| s.strip_suffix("_mt"))
            .ok_or_else(|| invalid_type(s))?;
        let ty = match family {
            "stdout_sink" => SinkType::Stdout,
            "stderr_sink" => SinkType::Stderr,
            "color_stdout_sink" => SinkType::ColorStdout,
            "color_stderr_sink" => SinkType::ColorStderr,
            "basic_file_sink" | "simple_file_sink" => SinkType::BasicFile,
            "rotating_file_sink" => SinkType::RotatingFile,
            "daily_file_sink" => SinkType::DailyFile,
            "null_sink" => SinkType::Null,
            "syslog_sink" => SinkType::Syslog,
            "dist_sink" => SinkType::Dist,
            "msvc_sink" => SinkType::Msvc,
            _ => return Err(invalid_type(s)),
        };
        Ok(ty)
    }
}

impl fmt::Display for SinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.family())
    }
}

fn invalid_type(s: &str) -> SetupError {
    SetupError::new(format!("Invalid sink type '{s}' found"))
}

// ---------------------------------------------------------------------------
// SinkKind: decoded variant fields
// ---------------------------------------------------------------------------

/// Default syslog facility (`LOG_USER`).
pub const DEFAULT_SYSLOG_FACILITY: i32 = 1 << 3;

/// Highest facility code (`LOG_LOCAL7`) before the shift into the priority.
const MAX_SYSLOG_FACILITY: i32 = 23;

/// A sink declaration decoded into its typed construction parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkKind {
    Stdout,
    Stderr,
    ColorStdout,
    ColorStderr,
    BasicFile {
        filename: PathBuf,
        truncate: bool,
    },
    RotatingFile {
        base_filename: PathBuf,
        max_size: u64,
        max_files: usize,
    },
    DailyFile {
        base_filename: PathBuf,
        rotation_hour: u32,
        rotation_minute: u32,
    },
    Null,
    Syslog {
        ident: String,
        option: i32,
        facility: i32,
    },
    /// Forwards to the named sinks, in declaration order.
    Dist {
        sinks: Vec<String>,
    },
    Msvc,
}

impl SinkKind {
    /// Decode the variant-specific fields of a declaration.
    pub fn decode(ty: SinkType, table: &Table) -> SetupResult<Self> {
        let kind = match ty {
            SinkType::Stdout => SinkKind::Stdout,
            SinkType::Stderr => SinkKind::Stderr,
            SinkType::ColorStdout => SinkKind::ColorStdout,
            SinkType::ColorStderr => SinkKind::ColorStderr,
            SinkType::Null => SinkKind::Null,
            SinkType::Msvc => SinkKind::Msvc,
            SinkType::BasicFile => SinkKind::BasicFile {
                filename: required::<String, _>(table, names::FILENAME, || {
                    missing(names::FILENAME, "string", ty)
                })?
                .into(),
                truncate: optional_or(table, names::TRUNCATE, false)?,
            },
            SinkType::RotatingFile => {
                let base_filename: String = required(table, names::BASE_FILENAME, || {
                    missing(names::BASE_FILENAME, "string", ty)
                })?;
                let max_size: String = required(table, names::MAX_SIZE, || {
                    missing(names::MAX_SIZE, "string", ty)
                })?;
                let max_files: usize = required(table, names::MAX_FILES, || {
                    missing(names::MAX_FILES, "u64", ty)
                })?;
                SinkKind::RotatingFile {
                    base_filename: base_filename.into(),
                    max_size: max_size.parse::<ByteSize>()?.as_bytes(),
                    max_files,
                }
            }
            SinkType::DailyFile => {
                let base_filename: String = required(table, names::BASE_FILENAME, || {
                    missing(names::BASE_FILENAME, "string", ty)
                })?;
                let rotation_hour: u32 = required(table, names::ROTATION_HOUR, || {
                    missing(names::ROTATION_HOUR, "u32", ty)
                })?;
                let rotation_minute: u32 = required(table, names::ROTATION_MINUTE, || {
                    missing(names::ROTATION_MINUTE, "u32", ty)
                })?;
                if rotation_hour > 23 {
                    setup_bail!("'{}' must be within 0..=23, got {rotation_hour}", names::ROTATION_HOUR);
                }
                if rotation_minute > 59 {
                    setup_bail!(
                        "'{}' must be within 0..=59, got {rotation_minute}",
                        names::ROTATION_MINUTE
                    );
                }
                SinkKind::DailyFile {
                    base_filename: base_filename.into(),
                    rotation_hour,
                    rotation_minute,
                }
            }
            SinkType::Syslog => {
                let facility: i32 =
                    optional_or(table, names::SYSLOG_FACILITY, DEFAULT_SYSLOG_FACILITY)?;
                if facility < 0 || facility % 8 != 0 || facility >> 3 > MAX_SYSLOG_FACILITY {
                    setup_bail!(
                        "'{}' must be a facility code shifted left by 3 (0..={}), got {facility}",
                        names::SYSLOG_FACILITY,
                        MAX_SYSLOG_FACILITY << 3
                    );
                }
                SinkKind::Syslog {
                    ident: optional_or(table, names::IDENT, String::new())?,
                    option: optional_or(table, names::SYSLOG_OPTION, 0)?,
                    facility,
                }
            }
            SinkType::Dist => SinkKind::Dist {
                sinks: required(table, names::SINKS, || {
                    missing(names::SINKS, "string array", ty)
                })?,
            },
        };
        Ok(kind)
    }

    /// Path whose parent directory `create_parent_dir` refers to.
    pub fn file_path(&self) -> Option<&Path> {
        match self {
            SinkKind::BasicFile { filename, .. } => Some(filename),
            SinkKind::RotatingFile { base_filename, .. }
            | SinkKind::DailyFile { base_filename, .. } => Some(base_filename),
            _ => None,
        }
    }

    /// Names this sink forwards to; empty for leaf sinks.
    pub fn forwards(&self) -> &[String] {
        match self {
            SinkKind::Dist { sinks } => sinks,
            _ => &[],
        }
    }
}

fn missing(field: &str, value: &str, ty: SinkType) -> String {
    format!("Missing '{field}' field of {value} value for {ty}")
}
