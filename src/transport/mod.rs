//! Transport Module
//!
//! Moves request and response bytes over one connection.
//!
//! ## Layout
//! - [`Transport`]: the contract the client talks to
//! - [`StreamTransport`]: buffered blocking stream, line-at-a-time reads
//! - [`FramedTransport`]: chunked reads into a frame buffer split on `\r\n`
//! - [`Dialer`]: opens the raw stream; [`TcpDialer`] for real sockets
//!
//! Both transports share the connection state machine in `link`: liveness,
//! bounded write retries, one reconnect-and-resend per failed write, and
//! reconnect reporting.

mod framed;
mod link;
mod stream;
mod tcp;

use std::io::{self, Read, Write};
use std::time::Duration;

use bytes::Bytes;
use crossbeam::channel::Receiver;

use crate::config::Config;
use crate::error::Result;

pub use framed::FramedTransport;
pub use stream::StreamTransport;
pub use tcp::TcpDialer;

/// Attempts a single write may spend on partial or stalled sends
pub const WRITE_RETRIES: usize = 8;

/// Events kept for a receiver that is not reading; older ones are dropped
pub const EVENT_BACKLOG: usize = 64;

/// Where and how to connect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
    pub connect_timeout: Duration,
    pub read_timeout: Option<Duration>,
    pub persistent: bool,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self::from(&Config::builder().host(host).port(port).build())
    }

    /// `host:port`
    pub fn target(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl From<&Config> for Endpoint {
    fn from(config: &Config) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            connect_timeout: config.connect_timeout,
            read_timeout: config.read_timeout,
            persistent: config.persistent,
        }
    }
}

/// Opens raw byte streams to an endpoint
pub trait Dialer {
    type Stream: Read + Write;

    fn dial(&self, endpoint: &Endpoint) -> io::Result<Self::Stream>;
}

/// What a successful write had to do
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Written on the existing connection
    Sent,
    /// The first attempt failed; the connection was replaced and the
    /// request sent again. The server may have seen it twice.
    Resent,
}

impl WriteOutcome {
    pub fn reconnected(self) -> bool {
        self == WriteOutcome::Resent
    }
}

/// Connection lifecycle notifications
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Connected { target: String },
    Reconnected { target: String },
    Disconnected { target: String },
}

/// One duplex connection carrying one request at a time
///
/// Every read and write on an inactive transport fails with a connection
/// error without touching the network.
pub trait Transport {
    /// Establish the connection (replacing any existing one)
    fn connect(&mut self) -> Result<()>;

    /// Next available chunk of bytes
    fn read(&mut self) -> Result<Bytes>;

    /// Exactly `len` bytes
    fn read_exact(&mut self, len: usize) -> Result<Bytes>;

    /// Bytes up to the next `\r\n`, delimiter stripped
    ///
    /// `max_length` caps the bytes consumed, delimiter included; when the
    /// cap is hit first the partial line is returned and the rest stays
    /// buffered.
    fn read_line(&mut self, max_length: Option<usize>) -> Result<String>;

    /// Write all of `data`
    fn write(&mut self, data: &[u8]) -> Result<WriteOutcome>;

    /// Replace the connection using the stored endpoint
    fn reconnect(&mut self) -> Result<()>;

    /// Whether a reconnect happened since the last call; clears the flag
    fn is_reconnected(&mut self) -> bool;

    /// Close the connection; returns whether the transport is now inactive
    fn disconnect(&mut self) -> bool;

    fn is_active(&self) -> bool;

    fn endpoint(&self) -> &Endpoint;

    /// Lifecycle events
    ///
    /// At most [`EVENT_BACKLOG`] unread events are kept; a slow receiver
    /// loses the oldest ones and always sees the latest state change.
    fn events(&self) -> Receiver<TransportEvent>;

    fn is_persistent(&self) -> bool {
        self.endpoint().persistent
    }

    fn host(&self) -> &str {
        &self.endpoint().host
    }

    fn port(&self) -> u16 {
        self.endpoint().port
    }

    /// Connect timeout
    fn timeout(&self) -> Duration {
        self.endpoint().connect_timeout
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn connect(&mut self) -> Result<()> {
        (**self).connect()
    }

    fn read(&mut self) -> Result<Bytes> {
        (**self).read()
    }

    fn read_exact(&mut self, len: usize) -> Result<Bytes> {
        (**self).read_exact(len)
    }

    fn read_line(&mut self, max_length: Option<usize>) -> Result<String> {
        (**self).read_line(max_length)
    }

    fn write(&mut self, data: &[u8]) -> Result<WriteOutcome> {
        (**self).write(data)
    }

    fn reconnect(&mut self) -> Result<()> {
        (**self).reconnect()
    }

    fn is_reconnected(&mut self) -> bool {
        (**self).is_reconnected()
    }

    fn disconnect(&mut self) -> bool {
        (**self).disconnect()
    }

    fn is_active(&self) -> bool {
        (**self).is_active()
    }

    fn endpoint(&self) -> &Endpoint {
        (**self).endpoint()
    }

    fn events(&self) -> Receiver<TransportEvent> {
        (**self).events()
    }
}
