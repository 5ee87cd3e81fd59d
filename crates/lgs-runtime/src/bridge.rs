//! Route `tracing` events into a configured [`Logger`].
//!
//! Libraries that log through `tracing` end up in the same sinks as the
//! application's configured loggers. The `domain` field used throughout
//! this workspace is rendered as a `[domain]` prefix:
//!
//! ```text
//! [2024-03-01 10:00:00.000] [app] [info] [conf] logging set up loggers=3
//! ```

use std::fmt::{self as stdfmt, Write as _};
use std::sync::Arc;

use lgs_config::{Level, SetupError, SetupResult};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::logger::Logger;
use crate::registry;

/// Events from this crate are never forwarded: a failing sink reports
/// through `tracing`, and forwarding that report could recurse.
const OWN_TARGET: &str = "lgs_runtime";

// ---------------------------------------------------------------------------
// LoggerLayer
// ---------------------------------------------------------------------------

pub struct LoggerLayer {
    logger: Arc<Logger>,
}

impl LoggerLayer {
    pub fn new(logger: Arc<Logger>) -> Self {
        Self { logger }
    }
}

impl<S: Subscriber> Layer<S> for LoggerLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        if meta.target().starts_with(OWN_TARGET) {
            return;
        }
        let level = from_tracing(*meta.level());
        if !self.logger.should_log(level) {
            return;
        }

        let mut fields = FieldCollector::default();
        event.record(&mut fields);
        self.logger.log(level, fields.render());
    }
}

fn from_tracing(level: tracing::Level) -> Level {
    match level {
        tracing::Level::TRACE => Level::Trace,
        tracing::Level::DEBUG => Level::Debug,
        tracing::Level::INFO => Level::Info,
        tracing::Level::WARN => Level::Warn,
        tracing::Level::ERROR => Level::Err,
    }
}

/// `EnvFilter` directive equivalent to a logger threshold.
fn directive(level: Level) -> &'static str {
    match level {
        Level::Trace => "trace",
        Level::Debug => "debug",
        Level::Info => "info",
        Level::Warn => "warn",
        Level::Err | Level::Critical => "error",
        Level::Off => "off",
    }
}

// ---------------------------------------------------------------------------
// FieldCollector: separates domain and message from the other fields
// ---------------------------------------------------------------------------

#[derive(Default)]
struct FieldCollector {
    domain: Option<String>,
    message: String,
    other_fields: String,
}

impl FieldCollector {
    fn push_separator(&mut self) {
        if !self.other_fields.is_empty() {
            self.other_fields.push(' ');
        }
    }

    fn render(self) -> String {
        let mut out = String::new();
        if let Some(domain) = &self.domain {
            let _ = write!(out, "[{domain}] ");
        }
        out.push_str(&self.message);
        if !self.other_fields.is_empty() {
            if !self.message.is_empty() {
                out.push(' ');
            }
            out.push_str(&self.other_fields);
        }
        out
    }
}

impl Visit for FieldCollector {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "domain" => self.domain = Some(value.to_string()),
            "message" => self.message = value.to_string(),
            name => {
                self.push_separator();
                write!(&mut self.other_fields, "{name}={value:?}").ok();
            }
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn stdfmt::Debug) {
        match field.name() {
            "domain" => {
                let s = format!("{value:?}");
                self.domain = Some(s.trim_matches('"').to_string());
            }
            "message" => {
                write!(&mut self.message, "{value:?}").ok();
            }
            name => {
                self.push_separator();
                write!(&mut self.other_fields, "{name}={value:?}").ok();
            }
        }
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.push_separator();
        write!(&mut self.other_fields, "{}={value}", field.name()).ok();
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.push_separator();
        write!(&mut self.other_fields, "{}={value}", field.name()).ok();
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.push_separator();
        write!(&mut self.other_fields, "{}={value}", field.name()).ok();
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Filter for a bridge into `logger`.
///
/// Precedence: `RUST_LOG` overrides the logger's own level.
pub fn env_filter(logger: &Logger) -> SetupResult<EnvFilter> {
    if std::env::var("RUST_LOG").is_ok() {
        return Ok(EnvFilter::from_default_env());
    }
    let directives = directive(logger.level());
    EnvFilter::try_new(directives)
        .map_err(|e| SetupError::new(format!("invalid log filter '{directives}': {e}")))
}

/// Install a global `tracing` subscriber forwarding into `logger`.
///
/// Fails if a global subscriber is already installed.
pub fn init_bridge(logger: Arc<Logger>) -> SetupResult<()> {
    let filter = env_filter(&logger)?;
    tracing_subscriber::registry()
        .with(LoggerLayer::new(logger).with_filter(filter))
        .try_init()
        .map_err(|e| SetupError::new(format!("Unable to install tracing bridge: {e}")))
}

/// [`init_bridge`] for a logger registered by a previous build.
pub fn init_bridge_for(name: &str) -> SetupResult<()> {
    let logger = registry::get(name)
        .ok_or_else(|| SetupError::new(format!("Unable to find logger '{name}' to bridge into")))?;
    init_bridge(logger)
}
