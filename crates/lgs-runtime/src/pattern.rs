//! Compiled `%`-flag format strings.
//!
//! | flag | output |
//! |------|--------|
//! | `%v` | message payload |
//! | `%n` | logger name |
//! | `%l` / `%L` | level / single-letter level |
//! | `%t` / `%P` | thread id / process id |
//! | `%Y %m %d %H %M %S` | date and time parts, zero padded |
//! | `%e` / `%f` | milliseconds / microseconds |
//! | `%z` | UTC offset (`+08:00`) |
//! | `%T` / `%D` / `%c` | `%H:%M:%S` / `%m/%d/%y` / `Thu Aug 23 15:35:46 2014` |
//! | `%^` / `%$` | start / end of the coloured range |
//! | `%%` | literal `%` |

use std::fmt::Write as _;
use std::ops::Range;

use lgs_config::{SetupError, SetupResult};

use crate::record::Record;

pub const DEFAULT_PATTERN: &str = "[%Y-%m-%d %H:%M:%S.%e] [%n] [%^%l%$] %v";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(String),
    Payload,
    LoggerName,
    Level,
    ShortLevel,
    ThreadId,
    ProcessId,
    /// A chrono format specifier for the record's local time.
    Time(&'static str),
    Millis,
    Micros,
    ColorStart,
    ColorEnd,
}

/// A rendered line, newline-terminated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedLine {
    pub text: String,
    /// Byte range to colour by level, from `%^` … `%$`.
    pub color: Option<Range<usize>>,
}

#[derive(Debug, Clone)]
pub struct PatternFormatter {
    pattern: String,
    tokens: Vec<Token>,
}

impl PatternFormatter {
    /// Compile `pattern`; an unknown flag or a trailing lone `%` is an error.
    pub fn new(pattern: &str) -> SetupResult<Self> {
        let mut tokens = Vec::new();
        let mut literal = String::new();
        let mut chars = pattern.chars();

        while let Some(c) = chars.next() {
            if c != '%' {
                literal.push(c);
                continue;
            }
            let Some(flag) = chars.next() else {
                return Err(SetupError::new(format!(
                    "Dangling '%' at end of pattern '{pattern}'"
                )));
            };
            let token = match flag {
                '%' => {
                    literal.push('%');
                    continue;
                }
                'v' => Token::Payload,
                'n' => Token::LoggerName,
                'l' => Token::Level,
                'L' => Token::ShortLevel,
                't' => Token::ThreadId,
                'P' => Token::ProcessId,
                'Y' => Token::Time("%Y"),
                'm' => Token::Time("%m"),
                'd' => Token::Time("%d"),
                'H' => Token::Time("%H"),
                'M' => Token::Time("%M"),
                'S' => Token::Time("%S"),
                'z' => Token::Time("%:z"),
                'T' => Token::Time("%H:%M:%S"),
                'D' => Token::Time("%m/%d/%y"),
                'c' => Token::Time("%a %b %d %H:%M:%S %Y"),
                'e' => Token::Millis,
                'f' => Token::Micros,
                '^' => Token::ColorStart,
                '$' => Token::ColorEnd,
                other => {
                    return Err(SetupError::new(format!(
                        "Unknown flag '%{other}' in pattern '{pattern}'"
                    )));
                }
            };
            if !literal.is_empty() {
                tokens.push(Token::Literal(std::mem::take(&mut literal)));
            }
            tokens.push(token);
        }
        if !literal.is_empty() {
            tokens.push(Token::Literal(literal));
        }

        Ok(Self {
            pattern: pattern.to_string(),
            tokens,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn format(&self, record: &Record) -> FormattedLine {
        let mut text = String::with_capacity(record.payload.len() + 64);
        let mut color_start = None;
        let mut color_end = None;

        for token in &self.tokens {
            match token {
                Token::Literal(s) => text.push_str(s),
                Token::Payload => text.push_str(&record.payload),
                Token::LoggerName => text.push_str(&record.logger),
                Token::Level => text.push_str(record.level.as_str()),
                Token::ShortLevel => text.push_str(record.level.short_str()),
                Token::ThreadId => {
                    let _ = write!(text, "{}", record.thread_id);
                }
                Token::ProcessId => {
                    let _ = write!(text, "{}", std::process::id());
                }
                Token::Time(fmt) => {
                    let _ = write!(text, "{}", record.time.format(fmt));
                }
                Token::Millis => {
                    let _ = write!(text, "{:03}", record.time.timestamp_subsec_millis() % 1000);
                }
                Token::Micros => {
                    let _ = write!(text, "{:06}", record.time.timestamp_subsec_micros() % 1_000_000);
                }
                Token::ColorStart => color_start = Some(text.len()),
                Token::ColorEnd => color_end = Some(text.len()),
            }
        }

        let color = color_start.map(|start| start..color_end.filter(|&e| e >= start).unwrap_or(text.len()));
        text.push('\n');
        FormattedLine { text, color }
    }
}

impl Default for PatternFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_PATTERN).unwrap_or_else(|_| Self {
            pattern: "%v".to_string(),
            tokens: vec![Token::Payload],
        })
    }
}
