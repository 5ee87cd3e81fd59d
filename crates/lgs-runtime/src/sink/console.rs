use std::io::{self, Write};

use anstream::stream::{AsLockedWrite, RawStream};
use anstream::{AutoStream, ColorChoice};
use anstyle::{AnsiColor, Style};
use lgs_config::Level;

use super::Sink;
use crate::pattern::FormattedLine;
use crate::record::{AtomicLevel, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleTarget {
    Stdout,
    Stderr,
}

/// Writes to the process's stdout or stderr, optionally colouring the
/// `%^ … %$` range of each line. Colour is only emitted to terminals.
#[derive(Debug)]
pub struct ConsoleSink {
    target: ConsoleTarget,
    color: bool,
    kind: &'static str,
    level: AtomicLevel,
}

impl ConsoleSink {
    pub fn new(target: ConsoleTarget, color: bool) -> Self {
        let kind = match (target, color) {
            (ConsoleTarget::Stdout, false) => "stdout",
            (ConsoleTarget::Stderr, false) => "stderr",
            (ConsoleTarget::Stdout, true) => "color_stdout",
            (ConsoleTarget::Stderr, true) => "color_stderr",
        };
        Self {
            target,
            color,
            kind,
            level: AtomicLevel::new(Level::Trace),
        }
    }

    /// Platform debug output. There is no debugger channel outside Windows,
    /// so lines go to stderr uncoloured.
    pub fn debug_output() -> Self {
        Self {
            kind: "msvc",
            ..Self::new(ConsoleTarget::Stderr, false)
        }
    }

    /// Colour choice for this sink's stream: `Auto` lets `anstream` strip
    /// styling when the stream is not a terminal (or `NO_COLOR` is set).
    fn color_choice(&self) -> ColorChoice {
        if self.color {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        }
    }

    fn write_to<S: RawStream + AsLockedWrite>(
        &self,
        out: &mut AutoStream<S>,
        record: &Record,
        line: &FormattedLine,
    ) -> io::Result<()> {
        match (&line.color, self.color) {
            (Some(range), true) => {
                let text = &line.text;
                let style = level_style(record.level);
                write!(
                    out,
                    "{}{}{}{}{}",
                    &text[..range.start],
                    style.render(),
                    &text[range.clone()],
                    style.render_reset(),
                    &text[range.end..]
                )
            }
            _ => out.write_all(line.text.as_bytes()),
        }
    }
}

fn level_style(level: Level) -> Style {
    match level {
        Level::Trace => AnsiColor::White.on_default(),
        Level::Debug => AnsiColor::Cyan.on_default(),
        Level::Info => AnsiColor::Green.on_default(),
        Level::Warn => AnsiColor::Yellow.on_default().bold(),
        Level::Err => AnsiColor::Red.on_default().bold(),
        Level::Critical => Style::new().bg_color(Some(AnsiColor::Red.into())).bold(),
        Level::Off => Style::new(),
    }
}

impl Sink for ConsoleSink {
    fn log(&self, record: &Record, line: &FormattedLine) -> io::Result<()> {
        match self.target {
            ConsoleTarget::Stdout => {
                let mut out = AutoStream::new(io::stdout().lock(), self.color_choice());
                self.write_to(&mut out, record, line)
            }
            ConsoleTarget::Stderr => {
                let mut out = AutoStream::new(io::stderr().lock(), self.color_choice());
                self.write_to(&mut out, record, line)
            }
        }
    }

    fn flush(&self) -> io::Result<()> {
        match self.target {
            ConsoleTarget::Stdout => io::stdout().flush(),
            ConsoleTarget::Stderr => io::stderr().flush(),
        }
    }

    fn level(&self) -> &AtomicLevel {
        &self.level
    }

    fn kind(&self) -> &'static str {
        self.kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::PatternFormatter;

    fn render(sink: &ConsoleSink, choice: ColorChoice, level: Level) -> String {
        let record = Record::new("app", level, "ready");
        let line = PatternFormatter::new("[%^%l%$] %v").unwrap().format(&record);
        let mut out = AutoStream::new(Vec::new(), choice);
        sink.write_to(&mut out, &record, &line).unwrap();
        String::from_utf8(out.into_inner()).unwrap()
    }

    #[test]
    fn colours_only_the_marked_range() {
        let sink = ConsoleSink::new(ConsoleTarget::Stdout, true);
        assert_eq!(
            render(&sink, ColorChoice::AlwaysAnsi, Level::Info),
            "[\x1b[32minfo\x1b[0m] ready\n"
        );
    }

    #[test]
    fn non_terminal_output_has_no_escapes() {
        let sink = ConsoleSink::new(ConsoleTarget::Stdout, true);
        assert_eq!(sink.color_choice(), ColorChoice::Auto);
        // a Vec is never a terminal, so `Auto` strips the styling
        for level in [Level::Info, Level::Warn, Level::Critical] {
            let text = render(&sink, ColorChoice::Auto, level);
            assert!(!text.contains('\x1b'), "{text:?}");
        }
        assert_eq!(render(&sink, ColorChoice::Auto, Level::Err), "[err] ready\n");
    }

    #[test]
    fn plain_console_ignores_colour_markers() {
        let sink = ConsoleSink::new(ConsoleTarget::Stderr, false);
        assert_eq!(sink.color_choice(), ColorChoice::Never);
        assert_eq!(render(&sink, ColorChoice::AlwaysAnsi, Level::Err), "[err] ready\n");
        assert_eq!(sink.kind(), "stderr");
        assert_eq!(ConsoleSink::debug_output().kind(), "msvc");
    }
}
