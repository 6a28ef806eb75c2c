//! Error types for beanline
//!
//! One error enum for every layer. Callers decide between retry and abort
//! by branching on [`Error::kind`].

use thiserror::Error;

use crate::protocol::Status;

/// Result type alias using the crate error
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad caller input, detected before any I/O
    InvalidArgument,
    /// No live connection, or the connection could not be established
    Connection,
    /// I/O on a live connection failed
    Socket,
    /// The peer answered something the command did not expect
    Protocol,
    /// The server is in a state that refuses work (retry later)
    Server,
}

/// Unified error type for beanline operations
#[derive(Debug, Error)]
pub enum Error {
    // -------------------------------------------------------------------------
    // Argument Errors
    // -------------------------------------------------------------------------
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Payload encoding failed: {0}")]
    Encode(String),

    // -------------------------------------------------------------------------
    // Connection Errors
    // -------------------------------------------------------------------------
    /// `code` is the OS error code when one is known
    #[error("Connection error [{code}]: {message}")]
    Connection { code: i32, message: String },

    // -------------------------------------------------------------------------
    // Socket Errors
    // -------------------------------------------------------------------------
    #[error("Socket error: {0}")]
    Socket(String),

    #[error("Connection to {target} closed by remote")]
    ClosedByRemote { target: String },

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Payload decoding failed: {0}")]
    Decode(String),

    #[error("Got unexpected status code [{0}]")]
    UnexpectedStatus(String),

    /// The server refused the request as malformed or oversized
    #[error("Request rejected by server: {0}")]
    Rejected(Status),

    // -------------------------------------------------------------------------
    // Server Errors
    // -------------------------------------------------------------------------
    #[error("Server unavailable: {0}")]
    Server(Status),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidArgument(_) | Error::Encode(_) => ErrorKind::InvalidArgument,
            Error::Connection { .. } => ErrorKind::Connection,
            Error::Socket(_) | Error::ClosedByRemote { .. } => ErrorKind::Socket,
            Error::Protocol(_)
            | Error::Decode(_)
            | Error::UnexpectedStatus(_)
            | Error::Rejected(_) => ErrorKind::Protocol,
            Error::Server(_) => ErrorKind::Server,
        }
    }

    /// Build a connection error from an OS-level I/O failure
    pub fn connection(err: &std::io::Error, context: &str) -> Self {
        Error::Connection {
            code: err.raw_os_error().unwrap_or(0),
            message: format!("{}: {}", context, err),
        }
    }

    /// Error raised for I/O attempted on a transport without a live handle
    pub fn closed(action: &str) -> Self {
        Error::Connection {
            code: 0,
            message: format!("Unable to {} closed connection", action),
        }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Error::InvalidArgument(message.into())
    }

    pub(crate) fn protocol(message: impl Into<String>) -> Self {
        Error::Protocol(message.into())
    }
}
