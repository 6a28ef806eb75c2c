//! Connection state shared by both transports
//!
//! Owns the handle, the endpoint it was dialed from, and the reconnect
//! bookkeeping. Reads are left to the transports; writes live here because
//! the retry and reconnect policy must not differ between them.

use std::fmt;
use std::io::{self, BufReader, ErrorKind, Write};

use crossbeam::channel::{self, Receiver, Sender, TrySendError};

use crate::error::{Error, Result};
use super::{Dialer, Endpoint, TransportEvent, WriteOutcome, EVENT_BACKLOG, WRITE_RETRIES};

/// Why a single send pass gave up
enum SendError {
    /// Hard I/O failure; the connection is suspect
    Io(io::Error),
    /// Retry budget spent on partial or stalled writes
    Exhausted { written: usize },
}

impl fmt::Display for SendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendError::Io(err) => write!(f, "{}", err),
            SendError::Exhausted { written } => write!(f, "stalled after {} bytes", written),
        }
    }
}

pub(crate) struct Link<D: Dialer> {
    endpoint: Endpoint,
    dialer: D,
    conn: Option<BufReader<D::Stream>>,
    reconnected: bool,
    events_tx: Sender<TransportEvent>,
    events_rx: Receiver<TransportEvent>,
}

impl<D: Dialer> Link<D> {
    pub fn new(endpoint: Endpoint, dialer: D) -> Self {
        let (events_tx, events_rx) = channel::bounded(EVENT_BACKLOG);
        Self {
            endpoint,
            dialer,
            conn: None,
            reconnected: false,
            events_tx,
            events_rx,
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn target(&self) -> String {
        self.endpoint.target()
    }

    pub fn events(&self) -> Receiver<TransportEvent> {
        self.events_rx.clone()
    }

    pub fn is_active(&self) -> bool {
        self.conn.is_some()
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    pub fn connect(&mut self) -> Result<()> {
        self.conn = None;
        match self.dialer.dial(&self.endpoint) {
            Ok(stream) => {
                self.conn = Some(BufReader::new(stream));
                tracing::debug!("Connected to {}", self.target());
                self.emit(TransportEvent::Connected {
                    target: self.target(),
                });
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Connection to {} failed: {}", self.target(), e);
                Err(Error::connection(
                    &e,
                    &format!("Unable to connect to {}", self.target()),
                ))
            }
        }
    }

    pub fn reconnect(&mut self) -> Result<()> {
        self.conn = None;
        match self.dialer.dial(&self.endpoint) {
            Ok(stream) => {
                self.conn = Some(BufReader::new(stream));
                self.reconnected = true;
                tracing::info!("Reconnected to {}", self.target());
                self.emit(TransportEvent::Reconnected {
                    target: self.target(),
                });
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Reconnect to {} failed: {}", self.target(), e);
                self.emit(TransportEvent::Disconnected {
                    target: self.target(),
                });
                Err(Error::Socket(format!(
                    "Unable to reconnect to {}: {}",
                    self.target(),
                    e
                )))
            }
        }
    }

    pub fn take_reconnected(&mut self) -> bool {
        std::mem::take(&mut self.reconnected)
    }

    pub fn disconnect(&mut self) -> bool {
        if self.conn.take().is_some() {
            tracing::debug!("Disconnected from {}", self.target());
            self.emit(TransportEvent::Disconnected {
                target: self.target(),
            });
        }
        !self.is_active()
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// The live handle, or a connection error naming `action`
    pub fn reader(&mut self, action: &str) -> Result<&mut BufReader<D::Stream>> {
        self.conn.as_mut().ok_or_else(|| Error::closed(action))
    }

    /// Turn a read failure into a socket error; the stream position is lost
    /// so the handle goes with it
    pub fn read_failed(&mut self, err: io::Error) -> Error {
        let target = self.target();
        self.disconnect();
        match err.kind() {
            ErrorKind::UnexpectedEof => Error::ClosedByRemote { target },
            ErrorKind::WouldBlock | ErrorKind::TimedOut => {
                Error::Socket(format!("Read from {} timed out", target))
            }
            _ => Error::Socket(format!("Failed to read from {}: {}", target, err)),
        }
    }

    /// The peer closed the stream
    pub fn remote_closed(&mut self) -> Error {
        tracing::debug!("{} closed the connection", self.target());
        self.read_failed(io::Error::from(ErrorKind::UnexpectedEof))
    }

    /// Framing gave up on the stream; drop the handle and report
    pub fn desynced(&mut self, message: String) -> Error {
        self.disconnect();
        Error::Protocol(message)
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Write `data` in full
    ///
    /// Partial and stalled writes are retried up to [`WRITE_RETRIES`] times
    /// on the same connection. A hard send failure replaces the connection
    /// once and resends the whole request.
    pub fn write(&mut self, data: &[u8]) -> Result<WriteOutcome> {
        if !self.is_active() {
            return Err(Error::closed("write into"));
        }

        match self.send(data) {
            Ok(()) => Ok(WriteOutcome::Sent),
            Err(SendError::Exhausted { written }) => {
                let target = self.target();
                self.disconnect();
                Err(Error::Socket(format!(
                    "Failed to write to {} after {} retries ({} of {} bytes sent)",
                    target,
                    WRITE_RETRIES,
                    written,
                    data.len()
                )))
            }
            Err(SendError::Io(e)) => {
                tracing::warn!("Send to {} failed ({}), reconnecting", self.target(), e);
                self.reconnect()?;

                match self.send(data) {
                    Ok(()) => Ok(WriteOutcome::Resent),
                    Err(e) => {
                        let target = self.target();
                        self.disconnect();
                        Err(Error::Socket(format!(
                            "Failed to write to {} after reconnect ({} retries): {}",
                            target, WRITE_RETRIES, e
                        )))
                    }
                }
            }
        }
    }

    fn send(&mut self, data: &[u8]) -> std::result::Result<(), SendError> {
        let target = self.target();
        let Some(conn) = self.conn.as_mut() else {
            return Err(SendError::Io(ErrorKind::NotConnected.into()));
        };
        let stream = conn.get_mut();

        let mut written = 0;
        let mut retries = 0;
        while written < data.len() {
            match stream.write(&data[written..]) {
                Ok(n) => {
                    written += n;
                    if written < data.len() {
                        retries += 1;
                        tracing::trace!(
                            "Partial write to {}: {} of {} bytes",
                            target,
                            written,
                            data.len()
                        );
                    }
                }
                Err(e) if is_transient(&e) => retries += 1,
                Err(e) => return Err(SendError::Io(e)),
            }

            if written < data.len() && retries >= WRITE_RETRIES {
                return Err(SendError::Exhausted { written });
            }
        }

        stream.flush().map_err(SendError::Io)
    }

    /// Queue an event, evicting the oldest one when the backlog is full
    fn emit(&self, event: TransportEvent) {
        if let Err(TrySendError::Full(event)) = self.events_tx.try_send(event) {
            let _ = self.events_rx.try_recv();
            let _ = self.events_tx.try_send(event);
        }
    }
}

fn is_transient(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::Interrupted | ErrorKind::WouldBlock | ErrorKind::TimedOut
    )
}
