//! Serial device adapter: newline-framed lines from the sensor board.
//!
//! [`LineFramer`] does the framing over any `BufRead`.  A partial line
//! survives read timeouts and is completed by the next read.  Lines longer
//! than [`MAX_LINE_LEN`] are dropped whole.

use std::io::{BufRead, BufReader, ErrorKind};
use std::time::Duration;

use log::{info, warn};
use serialport::SerialPort;

use crate::app::ports::{LineBuf, LineSource, MAX_LINE_LEN};
use crate::config::GatewayConfig;
use crate::error::SerialError;

/// Splits a byte stream into newline-terminated lines.
///
/// Holds the partial line between calls, so a read timeout in the middle
/// of a line loses nothing.
#[derive(Debug, Default)]
pub struct LineFramer {
    pending: LineBuf,
    overflow: bool,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pull bytes from `reader` until a full line is framed.
    ///
    /// `Ok(None)` means the read timed out, or an overlong line was
    /// discarded.  End of stream is an error: a serial device never closes
    /// cleanly.
    pub fn read_line<R: BufRead>(
        &mut self,
        reader: &mut R,
    ) -> Result<Option<LineBuf>, SerialError> {
        loop {
            let (consumed, complete) = match reader.fill_buf() {
                Ok([]) => return Err(SerialError::Io("end of stream".into())),
                Ok(buf) => {
                    let (part, complete) = match buf.iter().position(|&b| b == b'\n') {
                        Some(end) => (&buf[..end], true),
                        None => (buf, false),
                    };
                    if self.pending.extend_from_slice(part).is_err() {
                        self.overflow = true;
                    }
                    (part.len() + usize::from(complete), complete)
                }
                Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {
                    return Ok(None);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(SerialError::Io(e.to_string())),
            };
            reader.consume(consumed);
            if complete {
                return Ok(self.take_line());
            }
        }
    }

    /// Forget any partial line.
    pub fn reset(&mut self) {
        self.pending.clear();
        self.overflow = false;
    }

    fn take_line(&mut self) -> Option<LineBuf> {
        let line = core::mem::take(&mut self.pending);
        if core::mem::take(&mut self.overflow) {
            warn!("Serial line longer than {} bytes discarded", MAX_LINE_LEN);
            return None;
        }
        Some(line)
    }
}

pub struct SerialLink {
    path: String,
    baud: u32,
    timeout: Duration,
    reader: Option<BufReader<Box<dyn SerialPort>>>,
    framer: LineFramer,
}

impl SerialLink {
    /// Open `path` at `baud`.  Reads block for at most `timeout`.
    pub fn open(path: &str, baud: u32, timeout: Duration) -> Result<Self, SerialError> {
        let mut link = Self {
            path: path.to_owned(),
            baud,
            timeout,
            reader: None,
            framer: LineFramer::new(),
        };
        link.reopen()?;
        info!("Serial port {} open at {} baud", link.path, link.baud);
        Ok(link)
    }

    pub fn from_config(config: &GatewayConfig) -> Result<Self, SerialError> {
        Self::open(
            &config.serial_port,
            config.serial_baud,
            Duration::from_millis(config.serial_read_timeout_ms.into()),
        )
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl LineSource for SerialLink {
    fn read_line(&mut self) -> Result<Option<LineBuf>, SerialError> {
        let reader = self.reader.as_mut().ok_or(SerialError::NotOpen)?;
        self.framer.read_line(reader)
    }

    fn reopen(&mut self) -> Result<(), SerialError> {
        self.close();
        let port = serialport::new(&self.path, self.baud)
            .timeout(self.timeout)
            .open()
            .map_err(|e| SerialError::Open(format!("{}: {}", self.path, e)))?;
        self.reader = Some(BufReader::new(port));
        Ok(())
    }

    fn close(&mut self) {
        self.reader = None;
        self.framer.reset();
    }
}
