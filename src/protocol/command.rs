//! Command definitions
//!
//! One generic request type driven by the verb descriptors in
//! [`super::verb`]. A `Command` can only be built from arguments that pass
//! its verb's rules, so every instance renders to a well-formed request.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{Error, Result};
use super::codec::{self, CRLF, MAX_FRAME_SIZE};
use super::verb::{Outcome, Verb};
use super::yaml;
use super::{Job, Reply, ResponseHead};

/// Largest job body the server accepts by default (`max-job-size`)
pub const MAX_PAYLOAD_SIZE: usize = 65_535;

/// A validated protocol request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    verb: Verb,
    args: Vec<String>,
    body: Option<Bytes>,
}

impl Command {
    /// Build a command from raw arguments, applying the verb's rules
    ///
    /// `body` must be present exactly when the verb carries one.
    pub fn new<I, S>(verb: Verb, args: I, body: Option<Bytes>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let spec = verb.spec();
        let raw: Vec<S> = args.into_iter().collect();

        if raw.len() != spec.args.len() {
            return Err(Error::invalid(format!(
                "{} takes {} argument(s), got {}",
                spec.name,
                spec.args.len(),
                raw.len()
            )));
        }

        let args = spec
            .args
            .iter()
            .zip(&raw)
            .map(|(rule, value)| rule.check(value.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        match (&body, spec.has_body) {
            (Some(body), true) if body.len() > MAX_PAYLOAD_SIZE => {
                return Err(Error::invalid(format!(
                    "job payload must be at most {} bytes, got {}",
                    MAX_PAYLOAD_SIZE,
                    body.len()
                )));
            }
            (None, true) => {
                return Err(Error::invalid(format!("{} requires a body", spec.name)));
            }
            (Some(_), false) => {
                return Err(Error::invalid(format!("{} does not take a body", spec.name)));
            }
            _ => {}
        }

        Ok(Self { verb, args, body })
    }

    // =========================================================================
    // Constructors
    // =========================================================================

    pub fn put(body: impl Into<Bytes>, priority: u32, delay: u32, ttr: u32) -> Result<Self> {
        Self::new(
            Verb::Put,
            [priority.to_string(), delay.to_string(), ttr.to_string()],
            Some(body.into()),
        )
    }

    pub fn use_tube(tube: &str) -> Result<Self> {
        Self::new(Verb::Use, [tube], None)
    }

    pub fn reserve() -> Self {
        Self::bare(Verb::Reserve)
    }

    pub fn reserve_with_timeout(timeout: u32) -> Result<Self> {
        Self::new(Verb::ReserveWithTimeout, [timeout.to_string()], None)
    }

    pub fn reserve_job(id: u64) -> Result<Self> {
        Self::new(Verb::ReserveJob, [id.to_string()], None)
    }

    pub fn delete(id: u64) -> Result<Self> {
        Self::new(Verb::Delete, [id.to_string()], None)
    }

    pub fn release(id: u64, priority: u32, delay: u32) -> Result<Self> {
        Self::new(
            Verb::Release,
            [id.to_string(), priority.to_string(), delay.to_string()],
            None,
        )
    }

    pub fn bury(id: u64, priority: u32) -> Result<Self> {
        Self::new(Verb::Bury, [id.to_string(), priority.to_string()], None)
    }

    pub fn touch(id: u64) -> Result<Self> {
        Self::new(Verb::Touch, [id.to_string()], None)
    }

    pub fn watch(tube: &str) -> Result<Self> {
        Self::new(Verb::Watch, [tube], None)
    }

    pub fn ignore(tube: &str) -> Result<Self> {
        Self::new(Verb::Ignore, [tube], None)
    }

    pub fn peek(id: u64) -> Result<Self> {
        Self::new(Verb::Peek, [id.to_string()], None)
    }

    pub fn peek_ready() -> Self {
        Self::bare(Verb::PeekReady)
    }

    pub fn peek_delayed() -> Self {
        Self::bare(Verb::PeekDelayed)
    }

    pub fn peek_buried() -> Self {
        Self::bare(Verb::PeekBuried)
    }

    pub fn kick(bound: u32) -> Result<Self> {
        Self::new(Verb::Kick, [bound.to_string()], None)
    }

    pub fn kick_job(id: u64) -> Result<Self> {
        Self::new(Verb::KickJob, [id.to_string()], None)
    }

    pub fn stats() -> Self {
        Self::bare(Verb::Stats)
    }

    pub fn stats_job(id: u64) -> Result<Self> {
        Self::new(Verb::StatsJob, [id.to_string()], None)
    }

    pub fn stats_tube(tube: &str) -> Result<Self> {
        Self::new(Verb::StatsTube, [tube], None)
    }

    pub fn list_tubes() -> Self {
        Self::bare(Verb::ListTubes)
    }

    pub fn list_tube_used() -> Self {
        Self::bare(Verb::ListTubeUsed)
    }

    pub fn list_tubes_watched() -> Self {
        Self::bare(Verb::ListTubesWatched)
    }

    pub fn pause_tube(tube: &str, delay: u32) -> Result<Self> {
        Self::new(Verb::PauseTube, [tube.to_string(), delay.to_string()], None)
    }

    /// Verbs without arguments or body cannot fail validation
    fn bare(verb: Verb) -> Self {
        Self {
            verb,
            args: Vec::new(),
            body: None,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn verb(&self) -> Verb {
        self.verb
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// Render the request as it goes on the wire
    pub fn render(&self) -> Bytes {
        let body_len = self.body.as_ref().map_or(0, |b| b.len() + 24);
        let mut out = BytesMut::with_capacity(64 + body_len);

        out.put_slice(self.verb.name().as_bytes());
        for arg in &self.args {
            out.put_u8(b' ');
            out.put_slice(arg.as_bytes());
        }
        if let Some(body) = &self.body {
            out.put_u8(b' ');
            out.put_slice(body.len().to_string().as_bytes());
            out.put_slice(CRLF);
            out.put_slice(body);
        }
        out.put_slice(CRLF);

        out.freeze()
    }

    /// Read a rendered request back into a command
    ///
    /// The same rules as construction apply, so `decode(render(c)) == c`.
    pub fn decode(request: &[u8]) -> Result<Self> {
        let (line, rest) = codec::split_line(request)
            .ok_or_else(|| Error::invalid("request is not terminated by the line delimiter"))?;
        let line = std::str::from_utf8(line)
            .map_err(|_| Error::invalid("request line is not valid UTF-8"))?;

        let mut tokens = line.split(' ');
        let name = tokens.next().unwrap_or_default();
        let verb = Verb::from_name(name)
            .ok_or_else(|| Error::invalid(format!("unknown verb {:?}", name)))?;
        let mut args: Vec<&str> = tokens.collect();

        if !verb.spec().has_body {
            if !rest.is_empty() {
                return Err(Error::invalid(format!(
                    "{} request has {} trailing bytes",
                    verb.name(),
                    rest.len()
                )));
            }
            return Self::new(verb, args, None);
        }

        let declared: usize = args
            .pop()
            .and_then(|len| len.parse().ok())
            .ok_or_else(|| Error::invalid(format!("{} request is missing its body length", verb.name())))?;

        if rest.len().checked_sub(CRLF.len()) != Some(declared) || !rest.ends_with(CRLF) {
            return Err(Error::invalid(format!(
                "{} body does not match its declared length {}",
                verb.name(),
                declared
            )));
        }

        let body = Bytes::copy_from_slice(&rest[..declared]);
        Self::new(verb, args, Some(body))
    }

    // =========================================================================
    // Response Interpretation
    // =========================================================================

    /// Length of the body that follows this status line, if any
    ///
    /// Fails for status words the verb does not expect, before the caller
    /// tries to read a body that is not there.
    pub fn expected_body_len(&self, head: &ResponseHead) -> Result<Option<usize>> {
        let outcome = self.outcome(head)?;
        let Some(index) = outcome.body_len_param() else {
            return Ok(None);
        };

        let len = head.number_param(index)? as usize;
        if len > MAX_FRAME_SIZE {
            return Err(Error::protocol(format!(
                "Declared body of {} bytes exceeds the {} byte frame limit",
                len, MAX_FRAME_SIZE
            )));
        }
        Ok(Some(len))
    }

    /// Interpret a status line and optional body
    pub fn parse(&self, head: &ResponseHead, body: Option<&[u8]>) -> Result<Reply> {
        let outcome = self.outcome(head)?;
        let status = head.status;

        let body = match (outcome.body_len_param(), body) {
            (None, Some(data)) if !data.is_empty() => {
                return Err(Error::protocol("Unexpected response data passed"));
            }
            (Some(_), None) => {
                return Err(Error::protocol(format!(
                    "Status [{}] announces a body but none was read",
                    status
                )));
            }
            (_, body) => body.unwrap_or_default(),
        };

        match outcome {
            Outcome::Word => Ok(Reply::Word(status)),
            Outcome::Number => Ok(Reply::Number {
                status,
                value: head.number_param(0)?,
            }),
            Outcome::Name => Ok(Reply::Name(head.param(0)?.to_string())),
            Outcome::Job => {
                check_body_len(head, 1, body)?;
                Ok(Reply::Job(Job {
                    id: head.number_param(0)?,
                    body: Bytes::copy_from_slice(body),
                }))
            }
            Outcome::Data => {
                if body.is_empty() {
                    return Err(Error::protocol("Got unexpected empty response"));
                }
                check_body_len(head, 0, body)?;
                let text = std::str::from_utf8(body)
                    .map_err(|e| Error::protocol(format!("YAML body is not UTF-8: {}", e)))?;
                Ok(Reply::Yaml(yaml::parse(text, self.verb.spec().yaml_list)?))
            }
            Outcome::Empty => Ok(Reply::Empty(status)),
            Outcome::Rejected => Err(Error::Rejected(status)),
            Outcome::Unavailable => Err(Error::Server(status)),
        }
    }

    fn outcome(&self, head: &ResponseHead) -> Result<Outcome> {
        self.verb
            .outcome(head.status)
            .ok_or_else(|| Error::UnexpectedStatus(head.status.to_string()))
    }
}

fn check_body_len(head: &ResponseHead, index: usize, body: &[u8]) -> Result<()> {
    let declared = head.number_param(index)?;
    if declared != body.len() as u64 {
        return Err(Error::protocol(format!(
            "Status [{}] declared {} body bytes, got {}",
            head.status,
            declared,
            body.len()
        )));
    }
    Ok(())
}
