//! Status words
//!
//! The closed vocabulary a server may answer with.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Response status word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Inserted,
    Buried,
    ExpectedCrlf,
    JobTooBig,
    Draining,
    Using,
    Reserved,
    DeadlineSoon,
    TimedOut,
    Deleted,
    NotFound,
    Released,
    Touched,
    Watching,
    NotIgnored,
    Found,
    Kicked,
    Ok,
    Paused,
    OutOfMemory,
    InternalError,
    BadFormat,
    UnknownCommand,
}

impl Status {
    pub const ALL: [Status; 23] = [
        Status::Inserted,
        Status::Buried,
        Status::ExpectedCrlf,
        Status::JobTooBig,
        Status::Draining,
        Status::Using,
        Status::Reserved,
        Status::DeadlineSoon,
        Status::TimedOut,
        Status::Deleted,
        Status::NotFound,
        Status::Released,
        Status::Touched,
        Status::Watching,
        Status::NotIgnored,
        Status::Found,
        Status::Kicked,
        Status::Ok,
        Status::Paused,
        Status::OutOfMemory,
        Status::InternalError,
        Status::BadFormat,
        Status::UnknownCommand,
    ];

    /// The word as it appears on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Inserted => "INSERTED",
            Status::Buried => "BURIED",
            Status::ExpectedCrlf => "EXPECTED_CRLF",
            Status::JobTooBig => "JOB_TOO_BIG",
            Status::Draining => "DRAINING",
            Status::Using => "USING",
            Status::Reserved => "RESERVED",
            Status::DeadlineSoon => "DEADLINE_SOON",
            Status::TimedOut => "TIMED_OUT",
            Status::Deleted => "DELETED",
            Status::NotFound => "NOT_FOUND",
            Status::Released => "RELEASED",
            Status::Touched => "TOUCHED",
            Status::Watching => "WATCHING",
            Status::NotIgnored => "NOT_IGNORED",
            Status::Found => "FOUND",
            Status::Kicked => "KICKED",
            Status::Ok => "OK",
            Status::Paused => "PAUSED",
            Status::OutOfMemory => "OUT_OF_MEMORY",
            Status::InternalError => "INTERNAL_ERROR",
            Status::BadFormat => "BAD_FORMAT",
            Status::UnknownCommand => "UNKNOWN_COMMAND",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = Error;

    fn from_str(word: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == word)
            .ok_or_else(|| Error::UnexpectedStatus(word.to_string()))
    }
}
