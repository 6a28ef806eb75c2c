//! Response definitions
//!
//! What comes back from the server: the status line, and the typed reply a
//! command makes of it.

use bytes::Bytes;

use crate::error::{Error, Result};
use super::{Status, YamlValue};

/// A parsed status line: status word plus trailing parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHead {
    pub status: Status,
    pub params: Vec<String>,
}

impl ResponseHead {
    /// Split a status line (delimiter already stripped)
    pub fn parse(line: &str) -> Result<Self> {
        let mut tokens = line.split(' ').filter(|token| !token.is_empty());
        let word = tokens
            .next()
            .ok_or_else(|| Error::protocol("Got empty status line"))?;
        let status = word.parse::<Status>()?;

        Ok(Self {
            status,
            params: tokens.map(str::to_string).collect(),
        })
    }

    pub fn param(&self, index: usize) -> Result<&str> {
        self.params.get(index).map(String::as_str).ok_or_else(|| {
            Error::protocol(format!(
                "Status [{}] is missing parameter {}",
                self.status, index
            ))
        })
    }

    pub fn number_param(&self, index: usize) -> Result<u64> {
        let raw = self.param(index)?;
        raw.parse().map_err(|_| {
            Error::protocol(format!(
                "Status [{}] parameter {} is not a number: {:?}",
                self.status, index, raw
            ))
        })
    }
}

/// A job handed out by reserve or peek
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: u64,
    pub body: Bytes,
}

impl Job {
    /// Body as UTF-8 text
    pub fn body_str(&self) -> Result<&str> {
        std::str::from_utf8(&self.body)
            .map_err(|e| Error::protocol(format!("Job {} body is not UTF-8: {}", self.id, e)))
    }
}

/// Outcome of a successful `put`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PutResult {
    pub id: u64,
    /// `INSERTED`, or `BURIED` when the server ran out of memory growing
    /// the priority queue
    pub status: Status,
}

/// A command's interpretation of a response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// The status word is the whole answer
    Word(Status),
    /// A numeric answer: job id, watch count, kick count
    Number { status: Status, value: u64 },
    /// A tube name
    Name(String),
    Job(Job),
    Yaml(YamlValue),
    /// Normal "nothing there" answer, such as `NOT_FOUND` or `TIMED_OUT`
    Empty(Status),
}

impl Reply {
    pub fn is_empty(&self) -> bool {
        matches!(self, Reply::Empty(_))
    }
}
