//! Framed transport
//!
//! Pulls whatever the socket has into a frame buffer and cuts lines out of
//! it at the delimiter, the way event-driven socket clients deliver
//! packages. Leftover bytes stay buffered for the next read.

use std::io::BufRead;

use bytes::{Buf, Bytes, BytesMut};
use crossbeam::channel::Receiver;

use crate::error::Result;
use crate::protocol::codec::{self, CRLF, MAX_FRAME_SIZE};
use super::link::Link;
use super::{Dialer, Endpoint, TcpDialer, Transport, TransportEvent, WriteOutcome};

/// Initial frame buffer capacity
const FRAME_CAPACITY: usize = 8 * 1024;

/// Transport that frames responses from chunked reads
pub struct FramedTransport<D: Dialer = TcpDialer> {
    link: Link<D>,
    frames: BytesMut,
}

impl FramedTransport<TcpDialer> {
    /// Open a TCP connection to `endpoint`
    pub fn connect_tcp(endpoint: Endpoint) -> Result<Self> {
        Self::open(endpoint, TcpDialer)
    }
}

impl<D: Dialer> FramedTransport<D> {
    /// Create an unconnected transport
    pub fn new(endpoint: Endpoint, dialer: D) -> Self {
        Self {
            link: Link::new(endpoint, dialer),
            frames: BytesMut::with_capacity(FRAME_CAPACITY),
        }
    }

    /// Create and connect
    pub fn open(endpoint: Endpoint, dialer: D) -> Result<Self> {
        let mut transport = Self::new(endpoint, dialer);
        transport.connect()?;
        Ok(transport)
    }

    /// Bytes received but not yet handed out
    pub fn buffered(&self) -> usize {
        self.frames.len()
    }

    /// Append the next chunk from the socket to the frame buffer
    fn fill(&mut self) -> Result<()> {
        let reader = self.link.reader("read from")?;
        let received = match reader.fill_buf() {
            Ok(chunk) => {
                self.frames.extend_from_slice(chunk);
                chunk.len()
            }
            Err(e) => {
                self.frames.clear();
                return Err(self.link.read_failed(e));
            }
        };

        if received == 0 {
            self.frames.clear();
            return Err(self.link.remote_closed());
        }
        self.link.reader("read from")?.consume(received);
        tracing::trace!("Buffered {} bytes from {}", received, self.link.target());
        Ok(())
    }
}

impl<D: Dialer> Transport for FramedTransport<D> {
    fn connect(&mut self) -> Result<()> {
        self.frames.clear();
        self.link.connect()
    }

    fn read(&mut self) -> Result<Bytes> {
        self.link.reader("read from")?;
        if self.frames.is_empty() {
            self.fill()?;
        }
        Ok(self.frames.split().freeze())
    }

    fn read_exact(&mut self, len: usize) -> Result<Bytes> {
        self.link.reader("read from")?;
        while self.frames.len() < len {
            self.fill()?;
        }
        Ok(self.frames.split_to(len).freeze())
    }

    fn read_line(&mut self, max_length: Option<usize>) -> Result<String> {
        self.link.reader("read from")?;
        let cap = max_length.unwrap_or(MAX_FRAME_SIZE + CRLF.len());
        let mut scanned: usize = 0;

        loop {
            // restart one byte back in case the last chunk ended on '\r'
            let from = scanned.saturating_sub(1);
            if let Some(at) = codec::find_crlf(&self.frames[from..]).map(|i| from + i) {
                if at + CRLF.len() <= cap {
                    let line = self.frames.split_to(at);
                    self.frames.advance(CRLF.len());
                    return codec::line_to_string(&line);
                }
            }

            if self.frames.len() >= cap {
                if max_length.is_some() {
                    let partial = self.frames.split_to(cap);
                    return codec::line_to_string(&partial);
                }
                self.frames.clear();
                return Err(self.link.desynced(format!(
                    "Line from {} exceeds {} bytes",
                    self.link.target(),
                    MAX_FRAME_SIZE
                )));
            }

            scanned = self.frames.len();
            self.fill()?;
        }
    }

    fn write(&mut self, data: &[u8]) -> Result<WriteOutcome> {
        let outcome = self.link.write(data)?;
        if outcome.reconnected() {
            self.frames.clear();
        }
        Ok(outcome)
    }

    fn reconnect(&mut self) -> Result<()> {
        self.frames.clear();
        self.link.reconnect()
    }

    fn is_reconnected(&mut self) -> bool {
        self.link.take_reconnected()
    }

    fn disconnect(&mut self) -> bool {
        self.frames.clear();
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
