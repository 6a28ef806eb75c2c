//! Protocol Module
//!
//! Defines the beanstalkd text protocol as seen from a client.
//!
//! ## Exchange
//! ```text
//!   client                          server
//!     │  put 0 0 60 5\r\nhello\r\n    │
//!     │ ─────────────────────────────▶│
//!     │           INSERTED 17\r\n     │
//!     │ ◀─────────────────────────────│
//! ```
//!
//! One request is in flight at a time. A [`Command`] renders the request
//! and interprets the status line (plus body, when the status announces
//! one) according to its verb's descriptor.
//!
//! ## Status Classes
//! - result: the verb's success words (`INSERTED`, `RELEASED`, `USING`, ...)
//! - empty result: `NOT_FOUND`, `TIMED_OUT`, `DEADLINE_SOON` where normal
//! - rejected (client's fault): `BAD_FORMAT`, `UNKNOWN_COMMAND`,
//!   `EXPECTED_CRLF`, `JOB_TOO_BIG`, `NOT_IGNORED`
//! - unavailable (server state): `DRAINING`, `OUT_OF_MEMORY`, `INTERNAL_ERROR`

mod command;
mod response;
mod status;
pub mod codec;
pub mod verb;
pub mod yaml;

pub use command::{Command, MAX_PAYLOAD_SIZE};
pub use response::{Job, PutResult, Reply, ResponseHead};
pub use status::Status;
pub use verb::{Arg, Outcome, Verb, VerbSpec, MAX_PRIORITY};
pub use yaml::YamlValue;
