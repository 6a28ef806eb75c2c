//! Wire framing helpers
//!
//! ## Wire Format
//!
//! ### Request
//! ```text
//! VERB[ ARG]*\r\n
//! [BODY\r\n]            only for verbs that carry a body (put)
//! ```
//!
//! ### Response
//! ```text
//! STATUS[ PARAM]*\r\n
//! [BODY\r\n]            length given by a status-line parameter
//! ```

use crate::error::{Error, Result};

/// Line delimiter
pub const CRLF: &[u8] = b"\r\n";

/// Largest frame (status line or body) accepted from the peer (2 MB)
pub const MAX_FRAME_SIZE: usize = 2 * 1024 * 1024;

/// Position of the first `\r\n` in `buf`
pub fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(CRLF.len()).position(|window| window == CRLF)
}

/// Split `buf` at the first delimiter into `(line, rest)`
///
/// The delimiter belongs to neither half.
pub fn split_line(buf: &[u8]) -> Option<(&[u8], &[u8])> {
    find_crlf(buf).map(|at| (&buf[..at], &buf[at + CRLF.len()..]))
}

/// Decode a line as UTF-8 text
pub fn line_to_string(line: &[u8]) -> Result<String> {
    String::from_utf8(line.to_vec())
        .map_err(|e| Error::protocol(format!("Line is not valid UTF-8: {}", e)))
}
