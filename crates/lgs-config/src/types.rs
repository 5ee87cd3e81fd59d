use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::de;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{SetupError, SetupResult};

// ---------------------------------------------------------------------------
// Level
// ---------------------------------------------------------------------------

/// Severity threshold shared by sinks and loggers.
///
/// Ordered from most to least verbose; `Off` disables output entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Err,
    Critical,
    Off,
}

impl Level {
    pub const ALL: [Level; 7] = [
        Level::Trace,
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Err,
        Level::Critical,
        Level::Off,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Err => "err",
            Level::Critical => "critical",
            Level::Off => "off",
        }
    }

    /// Single-letter form used by the `%L` pattern flag.
    pub fn short_str(&self) -> &'static str {
        match self {
            Level::Trace => "T",
            Level::Debug => "D",
            Level::Info => "I",
            Level::Warn => "W",
            Level::Err => "E",
            Level::Critical => "C",
            Level::Off => "O",
        }
    }

    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    /// Inverse of [`Level::as_u8`]; out-of-range values clamp to `Off`.
    pub fn from_u8(v: u8) -> Self {
        Self::ALL.get(v as usize).copied().unwrap_or(Level::Off)
    }
}

impl FromStr for Level {
    type Err = SetupError;

    fn from_str(s: &str) -> SetupResult<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|l| l.as_str() == s)
            .ok_or_else(|| SetupError::new(format!("Invalid level string '{s}' provided")))
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ByteSize
// ---------------------------------------------------------------------------

static SIZE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*([0-9]+)\s*(T|G|M|K|)(B?)\s*$").expect("size regex is valid")
});

/// Parse a human-friendly size such as `"1M"`, `"500K"`, `"2GB"` or `"123"`.
///
/// Units are 1024-based and case-insensitive, a trailing `B` is optional and
/// a bare number counts bytes. Surrounding whitespace is ignored.
pub fn parse_max_size(s: &str) -> SetupResult<u64> {
    let caps = SIZE_RE
        .captures(s)
        .ok_or_else(|| SetupError::new(format!("Invalid string '{s}' for max size parsing")))?;

    let base: u64 = caps[1].parse().map_err(|e| {
        SetupError::new(format!(
            "Unexpected error for max size parsing on string '{s}': {e}"
        ))
    })?;

    let exp = match caps[2].to_ascii_uppercase().as_str() {
        "" => 0,
        "K" => 1,
        "M" => 2,
        "G" => 3,
        "T" => 4,
        other => {
            return Err(SetupError::new(format!(
                "Unexpected suffix '{other}' for max size parsing"
            )));
        }
    };

    1024u64
        .checked_pow(exp)
        .and_then(|mult| base.checked_mul(mult))
        .ok_or_else(|| SetupError::new(format!("Max size '{s}' overflows 64-bit byte count")))
}

/// A byte count written as a size string in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteSize(u64);

impl ByteSize {
    pub fn as_bytes(&self) -> u64 {
        self.0
    }
}

impl From<u64> for ByteSize {
    fn from(n: u64) -> Self {
        Self(n)
    }
}

impl From<ByteSize> for u64 {
    fn from(bs: ByteSize) -> Self {
        bs.0
    }
}

impl FromStr for ByteSize {
    type Err = SetupError;

    fn from_str(s: &str) -> SetupResult<Self> {
        parse_max_size(s).map(Self)
    }
}

impl fmt::Display for ByteSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const UNITS: [(u64, &str); 4] = [
            (1 << 40, "T"),
            (1 << 30, "G"),
            (1 << 20, "M"),
            (1 << 10, "K"),
        ];
        let b = self.0;
        if b == 0 {
            return write!(f, "0B");
        }
        for (mult, unit) in UNITS {
            if b.is_multiple_of(mult) {
                return write!(f, "{}{unit}", b / mult);
            }
        }
        write!(f, "{b}B")
    }
}

impl Serialize for ByteSize {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ByteSize {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    // -- parse_max_size --

    #[test]
    fn size_no_suffix() {
        assert_eq!(parse_max_size("123").unwrap(), 123);
    }

    #[test]
    fn size_byte_suffix() {
        assert_eq!(parse_max_size("123B").unwrap(), 123);
    }

    #[test]
    fn size_units() {
        for n in [0u64, 1, 7, 123, 4096] {
            assert_eq!(parse_max_size(&format!("{n}K")).unwrap(), n * KB);
            assert_eq!(parse_max_size(&format!("{n}KB")).unwrap(), n * KB);
            assert_eq!(parse_max_size(&format!("{n}M")).unwrap(), n * MB);
            assert_eq!(parse_max_size(&format!("{n}MB")).unwrap(), n * MB);
            assert_eq!(parse_max_size(&format!("{n}G")).unwrap(), n * GB);
            assert_eq!(parse_max_size(&format!("{n}T")).unwrap(), n * TB);
            assert_eq!(parse_max_size(&format!("{n}TB")).unwrap(), n * TB);
        }
    }

    #[test]
    fn size_case_insensitive() {
        assert_eq!(parse_max_size("500k").unwrap(), 500 * KB);
        assert_eq!(parse_max_size("2gb").unwrap(), 2 * GB);
        assert_eq!(parse_max_size("3Tb").unwrap(), 3 * TB);
    }

    #[test]
    fn size_surrounding_whitespace() {
        assert_eq!(parse_max_size("\n  45672  MB\t").unwrap(), 45672 * MB);
    }

    #[test]
    fn size_malformed() {
        let err = parse_max_size(" 1x2x3K").unwrap_err();
        assert!(err.message().contains("1x2x3K"), "{err}");
        assert!(parse_max_size("").is_err());
        assert!(parse_max_size("K").is_err());
        assert!(parse_max_size("12P").is_err());
        assert!(parse_max_size("-1M").is_err());
    }

    #[test]
    fn size_overflow_is_error() {
        assert!(parse_max_size("99999999999T").is_err());
    }

    #[test]
    fn bytesize_display() {
        assert_eq!(ByteSize::from(MB).to_string(), "1M");
        assert_eq!(ByteSize::from(3 * TB).to_string(), "3T");
        assert_eq!(ByteSize::from(1500).to_string(), "1500B");
        assert_eq!("10M".parse::<ByteSize>().unwrap().as_bytes(), 10 * MB);
    }

    // -- Level --

    #[test]
    fn level_parse_all() {
        for level in Level::ALL {
            assert_eq!(level.as_str().parse::<Level>().unwrap(), level);
            assert_eq!(Level::from_u8(level.as_u8()), level);
        }
    }

    #[test]
    fn level_parse_rejects_unknown() {
        let err = "error".parse::<Level>().unwrap_err();
        assert_eq!(err.message(), "Invalid level string 'error' provided");
    }

    #[test]
    fn level_ordering() {
        assert!(Level::Trace < Level::Info);
        assert!(Level::Critical < Level::Off);
    }

    #[test]
    fn level_deserializes_from_toml() {
        #[derive(Deserialize)]
        struct W {
            level: Level,
        }
        let w: W = toml::from_str(r#"level = "critical""#).unwrap();
        assert_eq!(w.level, Level::Critical);
        assert!(toml::from_str::<W>(r#"level = "loud""#).is_err());
    }
}
