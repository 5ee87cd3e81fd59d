use std::io;

use lgs_config::Level;
use parking_lot::Mutex;

use super::Sink;
use crate::pattern::FormattedLine;
use crate::record::{AtomicLevel, Record};

/// `LOG_PID`: include the process id after the ident.
pub const LOG_PID: i32 = 0x01;

/// `LOG_FACMASK`: facility bits of a priority value.
const FACILITY_MASK: i32 = 0x03f8;

const SYSLOG_PATH: &str = "/dev/log";

/// Sends each record to the local syslog daemon over its datagram socket.
///
/// The socket is connected on first use, so a host without a syslog daemon
/// only fails when something is actually logged.
pub struct SyslogSink {
    ident: String,
    option: i32,
    facility: i32,
    #[cfg(unix)]
    socket: Mutex<Option<std::os::unix::net::UnixDatagram>>,
    #[cfg(not(unix))]
    socket: Mutex<Option<()>>,
    level: AtomicLevel,
}

impl SyslogSink {
    pub fn new(ident: &str, option: i32, facility: i32) -> Self {
        Self {
            ident: ident.to_string(),
            option,
            facility,
            socket: Mutex::new(None),
            level: AtomicLevel::new(Level::Trace),
        }
    }

    /// Full datagram for `record`: `<PRI>ident[pid]: message`.
    pub fn frame(&self, record: &Record, line: &FormattedLine) -> String {
        let pri = (self.facility & FACILITY_MASK) | severity(record.level);
        let body = line.text.trim_end_matches('\n');
        let mut out = format!("<{pri}>");
        if !self.ident.is_empty() {
            out.push_str(&self.ident);
            if self.option & LOG_PID != 0 {
                out.push_str(&format!("[{}]", std::process::id()));
            }
            out.push_str(": ");
        }
        out.push_str(body);
        out
    }

    #[cfg(unix)]
    fn send(&self, datagram: &[u8]) -> io::Result<()> {
        use std::os::unix::net::UnixDatagram;

        let mut socket = self.socket.lock();
        if socket.is_none() {
            let s = UnixDatagram::unbound()?;
            s.connect(SYSLOG_PATH)?;
            *socket = Some(s);
        }
        match socket.as_ref() {
            Some(s) => s.send(datagram).map(|_| ()),
            None => Ok(()),
        }
    }

    #[cfg(not(unix))]
    fn send(&self, _datagram: &[u8]) -> io::Result<()> {
        let _ = &self.socket;
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            format!("{SYSLOG_PATH} is only available on unix"),
        ))
    }
}

/// Syslog severity for a level (`LOG_DEBUG` … `LOG_CRIT`).
fn severity(level: Level) -> i32 {
    match level {
        Level::Trace | Level::Debug => 7,
        Level::Info => 6,
        Level::Warn => 4,
        Level::Err => 3,
        Level::Critical => 2,
        Level::Off => 7,
    }
}

impl Sink for SyslogSink {
    fn log(&self, record: &Record, line: &FormattedLine) -> io::Result<()> {
        let datagram = self.frame(record, line);
        self.send(datagram.as_bytes())
    }

    fn flush(&self) -> io::Result<()> {
        Ok(())
    }

    fn level(&self) -> &AtomicLevel {
        &self.level
    }

    fn kind(&self) -> &'static str {
        "syslog"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::PatternFormatter;

    #[test]
    fn frame_priority_and_ident() {
        let record = Record::new("app", Level::Err, "disk failed");
        let line = PatternFormatter::new("%v").unwrap().format(&record);

        let sink = SyslogSink::new("myapp", 0, 8);
        assert_eq!(sink.frame(&record, &line), "<11>myapp: disk failed");

        let bare = SyslogSink::new("", 0, 8);
        assert_eq!(bare.frame(&record, &line), "<11>disk failed");

        let with_pid = SyslogSink::new("myapp", LOG_PID, 16 << 3);
        let framed = with_pid.frame(&record, &line);
        assert!(framed.starts_with(&format!("<131>myapp[{}]: ", std::process::id())), "{framed}");
    }

    #[test]
    fn out_of_range_facility_never_overflows() {
        let record = Record::new("app", Level::Critical, "boom");
        let line = PatternFormatter::new("%v").unwrap().format(&record);
        let sink = SyslogSink::new("", 0, i32::MAX);
        assert_eq!(sink.frame(&record, &line), "<1018>boom");
    }
}
