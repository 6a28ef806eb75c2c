//! Blocking stream transport
//!
//! Reads the buffered stream a line at a time, retrying until the
//! delimiter shows up or the peer hangs up.

use std::io::{self, BufRead, Read};

use bytes::Bytes;
use crossbeam::channel::Receiver;

use crate::error::{Error, Result};
use crate::protocol::codec::{CRLF, MAX_FRAME_SIZE};
use super::link::Link;
use super::{Dialer, Endpoint, TcpDialer, Transport, TransportEvent, WriteOutcome};

/// Result of one attempt to pull a line off the stream
enum LineRead {
    Line(Vec<u8>),
    /// Cap reached before a delimiter
    Capped(Vec<u8>),
    /// Peer closed before a delimiter
    Eof,
}

/// Transport over a buffered blocking stream
pub struct StreamTransport<D: Dialer = TcpDialer> {
    link: Link<D>,
}

impl StreamTransport<TcpDialer> {
    /// Open a TCP connection to `endpoint`
    pub fn connect_tcp(endpoint: Endpoint) -> Result<Self> {
        Self::open(endpoint, TcpDialer)
    }
}

impl<D: Dialer> StreamTransport<D> {
    /// Create an unconnected transport
    pub fn new(endpoint: Endpoint, dialer: D) -> Self {
        Self {
            link: Link::new(endpoint, dialer),
        }
    }

    /// Create and connect
    pub fn open(endpoint: Endpoint, dialer: D) -> Result<Self> {
        let mut transport = Self::new(endpoint, dialer);
        transport.link.connect()?;
        Ok(transport)
    }
}

impl<D: Dialer> Transport for StreamTransport<D> {
    fn connect(&mut self) -> Result<()> {
        self.link.connect()
    }

    fn read(&mut self) -> Result<Bytes> {
        let reader = self.link.reader("read from")?;
        let chunk = match reader.fill_buf() {
            Ok(buf) => Bytes::copy_from_slice(buf),
            Err(e) => return Err(self.link.read_failed(e)),
        };

        if chunk.is_empty() {
            return Err(self.link.remote_closed());
        }
        self.link.reader("read from")?.consume(chunk.len());
        Ok(chunk)
    }

    fn read_exact(&mut self, len: usize) -> Result<Bytes> {
        let reader = self.link.reader("read from")?;
        let mut buf = vec![0u8; len];
        match reader.read_exact(&mut buf) {
            Ok(()) => Ok(Bytes::from(buf)),
            Err(e) => Err(self.link.read_failed(e)),
        }
    }

    fn read_line(&mut self, max_length: Option<usize>) -> Result<String> {
        let cap = max_length.unwrap_or(MAX_FRAME_SIZE + CRLF.len());
        let reader = self.link.reader("read from")?;

        let line = match next_line(reader, cap) {
            Ok(LineRead::Line(line)) => line,
            Ok(LineRead::Capped(partial)) if max_length.is_some() => partial,
            Ok(LineRead::Capped(_)) => {
                return Err(self.link.desynced(format!(
                    "Line from {} exceeds {} bytes",
                    self.link.target(),
                    MAX_FRAME_SIZE
                )));
            }
            Ok(LineRead::Eof) => return Err(self.link.remote_closed()),
            Err(e) => return Err(self.link.read_failed(e)),
        };

        String::from_utf8(line)
            .map_err(|e| Error::protocol(format!("Line is not valid UTF-8: {}", e)))
    }

    fn write(&mut self, data: &[u8]) -> Result<WriteOutcome> {
        self.link.write(data)
    }

    fn reconnect(&mut self) -> Result<()> {
        self.link.reconnect()
    }

    fn is_reconnected(&mut self) -> bool {
        self.link.take_reconnected()
    }

    fn disconnect(&mut self) -> bool {
        self.link.disconnect()
    }

    fn is_active(&self) -> bool {
        self.link.is_active()
    }

    fn endpoint(&self) -> &Endpoint {
        self.link.endpoint()
    }

    fn events(&self) -> Receiver<TransportEvent> {
        self.link.events()
    }
}

/// Read until `\r\n`, consuming at most `cap` bytes
///
/// A bare `\n` is line content, not a delimiter, so reading goes on.
fn next_line<R: BufRead>(reader: &mut R, cap: usize) -> io::Result<LineRead> {
    let mut line = Vec::new();
    loop {
        let budget = cap.saturating_sub(line.len());
        if budget == 0 {
            return Ok(LineRead::Capped(line));
        }

        let n = reader
            .by_ref()
            .take(budget as u64)
            .read_until(b'\n', &mut line)?;
        if n == 0 {
            return Ok(LineRead::Eof);
        }
        if line.ends_with(CRLF) {
            line.truncate(line.len() - CRLF.len());
            return Ok(LineRead::Line(line));
        }
    }
}
