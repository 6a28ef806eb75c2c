//! Client Module
//!
//! The orchestrator: one method per verb, each running the same cycle
//!
//! ```text
//! Command::new ─▶ render ─▶ write ─▶ read_line ─▶ [read body] ─▶ parse
//! ```
//!
//! Nothing is retried here. If the transport had to reconnect to get a
//! request out, the call still returns normally; ask
//! [`Client::is_reconnected`] (or watch [`Client::events`]) before assuming
//! the server saw the request only once.

mod shared;

use std::time::Duration;

use bytes::Bytes;
use crossbeam::channel::Receiver;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::{Config, TransportMode};
use crate::error::{Error, Result};
use crate::payload::PayloadCodec;
use crate::protocol::codec::CRLF;
use crate::protocol::{Command, Job, PutResult, Reply, ResponseHead, Status, YamlValue};
use crate::transport::{
    Endpoint, FramedTransport, StreamTransport, Transport, TransportEvent,
};

pub use shared::SharedClient;

/// Transport type used by [`Client::connect`]
pub type BoxedTransport = Box<dyn Transport + Send>;

/// Priority, delay and ttr applied by [`Client::put`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct JobDefaults {
    priority: u32,
    delay: u32,
    ttr: u32,
}

impl From<&Config> for JobDefaults {
    fn from(config: &Config) -> Self {
        Self {
            priority: config.default_priority,
            delay: config.default_delay,
            ttr: config.default_ttr,
        }
    }
}

/// Blocking work-queue client
pub struct Client<T: Transport = BoxedTransport> {
    transport: T,
    codec: Option<PayloadCodec>,
    defaults: JobDefaults,
}

impl Client<BoxedTransport> {
    /// Connect over TCP with the transport `config.mode` selects
    pub fn connect(config: &Config) -> Result<Self> {
        let endpoint = Endpoint::from(config);
        tracing::debug!("Connecting to {} ({:?} transport)", endpoint.target(), config.mode);

        let transport: BoxedTransport = match config.mode {
            TransportMode::Stream => Box::new(StreamTransport::connect_tcp(endpoint)?),
            TransportMode::Framed => Box::new(FramedTransport::connect_tcp(endpoint)?),
        };
        Ok(Self::with_config(transport, config))
    }
}

impl<T: Transport> Client<T> {
    /// Wrap a transport, using default job settings
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, &Config::default())
    }

    /// Wrap a transport, taking job defaults from `config`
    pub fn with_config(transport: T, config: &Config) -> Self {
        Self {
            transport,
            codec: None,
            defaults: JobDefaults::from(config),
        }
    }

    /// Use `codec` for structured payloads
    pub fn with_codec(mut self, codec: PayloadCodec) -> Self {
        self.codec = Some(codec);
        self
    }

    pub fn codec(&self) -> Option<PayloadCodec> {
        self.codec
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    // =========================================================================
    // Request Cycle
    // =========================================================================

    /// Send one command and interpret its response
    ///
    /// A malformed or unexpected response leaves the stream at an unknown
    /// position, so the connection is dropped and must be re-established
    /// before the next call.
    pub fn execute(&mut self, command: &Command) -> Result<Reply> {
        let verb = command.verb().name();

        if self.transport.write(&command.render())?.reconnected() {
            tracing::warn!(
                "{} was resent after a reconnect to {}; it may have been applied twice",
                verb,
                self.transport.endpoint().target()
            );
        }

        let reply = self.read_reply(command);
        if let Err(e) = &reply {
            if loses_framing(e) && self.transport.is_active() {
                tracing::warn!("Dropping connection after bad {} response: {}", verb, e);
                self.transport.disconnect();
            }
        }
        reply
    }

    fn read_reply(&mut self, command: &Command) -> Result<Reply> {
        let verb = command.verb().name();

        let line = self.transport.read_line(None)?;
        tracing::trace!("{} -> {}", verb, line);
        let head = ResponseHead::parse(&line)?;

        let body = match command.expected_body_len(&head)? {
            Some(len) => {
                let data = self.transport.read_exact(len)?;
                let tail = self.transport.read_line(Some(CRLF.len()))?;
                if !tail.is_empty() {
                    return Err(Error::protocol(format!(
                        "{} body of {} bytes is not followed by the line delimiter",
                        verb, len
                    )));
                }
                Some(data)
            }
            None => None,
        };

        command.parse(&head, body.as_deref())
    }

    // =========================================================================
    // Producer Commands
    // =========================================================================

    /// Put a job with the default priority, delay and ttr
    pub fn put(&mut self, body: impl Into<Bytes>) -> Result<PutResult> {
        let JobDefaults { priority, delay, ttr } = self.defaults;
        self.put_with(body, priority, delay, ttr)
    }

    pub fn put_with(
        &mut self,
        body: impl Into<Bytes>,
        priority: u32,
        delay: u32,
        ttr: u32,
    ) -> Result<PutResult> {
        let command = Command::put(body, priority, delay, ttr)?;
        match self.execute(&command)? {
            Reply::Number { status, value } => Ok(PutResult { id: value, status }),
            other => Err(unexpected_reply(&command, &other)),
        }
    }

    /// Put a structured value through the configured codec
    pub fn put_value<V: Serialize + ?Sized>(
        &mut self,
        value: &V,
        priority: u32,
        delay: u32,
        ttr: u32,
    ) -> Result<PutResult> {
        let codec = self.codec.ok_or_else(|| {
            Error::invalid("payload is not a string or bytes and no payload codec is set")
        })?;
        let body = codec.encode(value)?;
        self.put_with(body, priority, delay, ttr)
    }

    /// Tube that subsequent puts go to
    pub fn use_tube(&mut self, tube: &str) -> Result<String> {
        let command = Command::use_tube(tube)?;
        self.expect_name(&command)
    }

    pub fn list_tube_used(&mut self) -> Result<String> {
        self.expect_name(&Command::list_tube_used())
    }

    // =========================================================================
    // Worker Commands
    // =========================================================================

    /// Block until a job is available; `None` when the server reports a
    /// deadline or timeout instead
    pub fn reserve(&mut self) -> Result<Option<Job>> {
        self.expect_job(&Command::reserve())
    }

    pub fn reserve_with_timeout(&mut self, timeout: u32) -> Result<Option<Job>> {
        let command = Command::reserve_with_timeout(timeout)?;
        self.expect_job(&command)
    }

    pub fn reserve_job(&mut self, id: u64) -> Result<Option<Job>> {
        let command = Command::reserve_job(id)?;
        self.expect_job(&command)
    }

    /// `false` when the job does not exist
    pub fn delete(&mut self, id: u64) -> Result<bool> {
        let command = Command::delete(id)?;
        self.expect_word(&command).map(|status| status.is_some())
    }

    /// `RELEASED` or `BURIED`; `None` when the job no longer exists
    pub fn release(&mut self, id: u64, priority: u32, delay: u32) -> Result<Option<Status>> {
        let command = Command::release(id, priority, delay)?;
        self.expect_word(&command)
    }

    pub fn bury(&mut self, id: u64, priority: u32) -> Result<bool> {
        let command = Command::bury(id, priority)?;
        self.expect_word(&command).map(|status| status.is_some())
    }

    pub fn touch(&mut self, id: u64) -> Result<bool> {
        let command = Command::touch(id)?;
        self.expect_word(&command).map(|status| status.is_some())
    }

    /// Returns the number of tubes now watched
    pub fn watch(&mut self, tube: &str) -> Result<u64> {
        let command = Command::watch(tube)?;
        self.expect_number(&command)
    }

    /// Returns the number of tubes now watched
    pub fn ignore(&mut self, tube: &str) -> Result<u64> {
        let command = Command::ignore(tube)?;
        self.expect_number(&command)
    }

    pub fn list_tubes_watched(&mut self) -> Result<Vec<String>> {
        self.expect_list(&Command::list_tubes_watched())
    }

    // =========================================================================
    // Inspection Commands
    // =========================================================================

    pub fn peek(&mut self, id: u64) -> Result<Option<Job>> {
        let command = Command::peek(id)?;
        self.expect_job(&command)
    }

    pub fn peek_ready(&mut self) -> Result<Option<Job>> {
        self.expect_job(&Command::peek_ready())
    }

    pub fn peek_delayed(&mut self) -> Result<Option<Job>> {
        self.expect_job(&Command::peek_delayed())
    }

    pub fn peek_buried(&mut self) -> Result<Option<Job>> {
        self.expect_job(&Command::peek_buried())
    }

    /// Returns the number of jobs kicked
    pub fn kick(&mut self, bound: u32) -> Result<u64> {
        let command = Command::kick(bound)?;
        self.expect_number(&command)
    }

    pub fn kick_job(&mut self, id: u64) -> Result<bool> {
        let command = Command::kick_job(id)?;
        self.expect_word(&command).map(|status| status.is_some())
    }

    /// Server-wide statistics
    pub fn stats(&mut self) -> Result<YamlValue> {
        let command = Command::stats();
        self.expect_yaml(&command)?
            .ok_or_else(|| Error::protocol("stats returned no document"))
    }

    pub fn stats_job(&mut self, id: u64) -> Result<Option<YamlValue>> {
        let command = Command::stats_job(id)?;
        self.expect_yaml(&command)
    }

    pub fn stats_tube(&mut self, tube: &str) -> Result<Option<YamlValue>> {
        let command = Command::stats_tube(tube)?;
        self.expect_yaml(&command)
    }

    pub fn list_tubes(&mut self) -> Result<Vec<String>> {
        self.expect_list(&Command::list_tubes())
    }

    /// `false` when the tube does not exist
    pub fn pause_tube(&mut self, tube: &str, delay: u32) -> Result<bool> {
        let command = Command::pause_tube(tube, delay)?;
        self.expect_word(&command).map(|status| status.is_some())
    }

    /// Decode a job body with the configured codec
    pub fn decode_job<V: DeserializeOwned>(&self, job: &Job) -> Result<V> {
        let codec = self
            .codec
            .ok_or_else(|| Error::invalid("no payload codec is set"))?;
        codec.decode(&job.body)
    }

    // =========================================================================
    // Connection State
    // =========================================================================

    pub fn is_active(&self) -> bool {
        self.transport.is_active()
    }

    pub fn is_persistent(&self) -> bool {
        self.transport.is_persistent()
    }

    pub fn host(&self) -> &str {
        self.transport.host()
    }

    pub fn port(&self) -> u16 {
        self.transport.port()
    }

    pub fn timeout(&self) -> Duration {
        self.transport.timeout()
    }

    pub fn disconnect(&mut self) -> bool {
        self.transport.disconnect()
    }

    pub fn reconnect(&mut self) -> Result<()> {
        self.transport.reconnect()
    }

    /// Whether the connection was replaced since the last call; clears the
    /// flag
    pub fn is_reconnected(&mut self) -> bool {
        self.transport.is_reconnected()
    }

    pub fn events(&self) -> Receiver<TransportEvent> {
        self.transport.events()
    }

    // =========================================================================
    // Reply Shapes
    // =========================================================================

    fn expect_word(&mut self, command: &Command) -> Result<Option<Status>> {
        match self.execute(command)? {
            Reply::Word(status) => Ok(Some(status)),
            Reply::Empty(_) => Ok(None),
            other => Err(unexpected_reply(command, &other)),
        }
    }

    fn expect_number(&mut self, command: &Command) -> Result<u64> {
        match self.execute(command)? {
            Reply::Number { value, .. } => Ok(value),
            other => Err(unexpected_reply(command, &other)),
        }
    }

    fn expect_name(&mut self, command: &Command) -> Result<String> {
        match self.execute(command)? {
            Reply::Name(name) => Ok(name),
            other => Err(unexpected_reply(command, &other)),
        }
    }

    fn expect_job(&mut self, command: &Command) -> Result<Option<Job>> {
        match self.execute(command)? {
            Reply::Job(job) => Ok(Some(job)),
            Reply::Empty(status) => {
                tracing::debug!("{} answered {}", command.verb().name(), status);
                Ok(None)
            }
            other => Err(unexpected_reply(command, &other)),
        }
    }

    fn expect_yaml(&mut self, command: &Command) -> Result<Option<YamlValue>> {
        match self.execute(command)? {
            Reply::Yaml(doc) => Ok(Some(doc)),
            Reply::Empty(_) => Ok(None),
            other => Err(unexpected_reply(command, &other)),
        }
    }

    fn expect_list(&mut self, command: &Command) -> Result<Vec<String>> {
        match self.expect_yaml(command)? {
            Some(YamlValue::Sequence(items)) => Ok(items),
            _ => Err(Error::protocol(format!(
                "{} did not return a list",
                command.verb().name()
            ))),
        }
    }
}

/// Whether a failed exchange may have left response bytes unread
///
/// Server refusals are complete one-line responses; they leave the stream
/// in step.
fn loses_framing(err: &Error) -> bool {
    matches!(err, Error::Protocol(_) | Error::UnexpectedStatus(_))
}

fn unexpected_reply(command: &Command, reply: &Reply) -> Error {
    Error::protocol(format!(
        "Unexpected reply to {}: {:?}",
        command.verb().name(),
        reply
    ))
}
