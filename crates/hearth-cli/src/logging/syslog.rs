//! Local syslog sink over a unix datagram socket.

use std::io::{self, Write};
use std::os::unix::net::UnixDatagram;
use std::path::Path;
use std::sync::Arc;

use tracing::{Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;

pub const DEFAULT_ADDRESS: &str = "/dev/log";

/// Facility code for a syslog facility name.
pub fn facility_code(name: &str) -> Option<u8> {
    let code = match name.trim().to_ascii_lowercase().as_str() {
        "kern" => 0,
        "user" => 1,
        "mail" => 2,
        "daemon" => 3,
        "auth" => 4,
        "syslog" => 5,
        "lpr" => 6,
        "news" => 7,
        "local0" => 16,
        "local1" => 17,
        "local2" => 18,
        "local3" => 19,
        "local4" => 20,
        "local5" => 21,
        "local6" => 22,
        "local7" => 23,
        _ => return None,
    };
    Some(code)
}

fn severity(level: &Level) -> u8 {
    match *level {
        Level::ERROR => 3,
        Level::WARN => 4,
        Level::INFO => 6,
        Level::DEBUG | Level::TRACE => 7,
    }
}

/// Connected syslog socket, handed to a fmt layer as its writer.
#[derive(Debug, Clone)]
pub struct SyslogWriter {
    socket: Arc<UnixDatagram>,
    facility: u8,
    ident: String,
}

impl SyslogWriter {
    pub fn connect(address: impl AsRef<Path>, facility: u8, ident: impl Into<String>) -> io::Result<Self> {
        let socket = UnixDatagram::unbound()?;
        socket.connect(address)?;
        Ok(Self {
            socket: Arc::new(socket),
            facility,
            ident: ident.into(),
        })
    }

    fn line(&self, level: &Level) -> SyslogLine {
        let priority = u16::from(self.facility) * 8 + u16::from(severity(level));
        SyslogLine {
            socket: Arc::clone(&self.socket),
            prefix: format!("<{priority}>{}[{}]: ", self.ident, std::process::id()),
            buf: Vec::new(),
        }
    }
}

impl<'a> MakeWriter<'a> for SyslogWriter {
    type Writer = SyslogLine;

    fn make_writer(&'a self) -> Self::Writer {
        self.line(&Level::INFO)
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        self.line(meta.level())
    }
}

/// One event. Sent as a single datagram when dropped.
pub struct SyslogLine {
    socket: Arc<UnixDatagram>,
    prefix: String,
    buf: Vec<u8>,
}

impl Write for SyslogLine {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for SyslogLine {
    fn drop(&mut self) {
        let text = String::from_utf8_lossy(&self.buf);
        let text = text.trim_end_matches(['\r', '\n']);
        if text.is_empty() {
            return;
        }
        let message = format!("{}{}", self.prefix, text);
        // Nowhere left to report a lost log line.
        let _ = self.socket.send(message.as_bytes());
    }
}
