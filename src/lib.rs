//! # beanline
//!
//! A blocking client for the beanstalkd work-queue protocol with:
//! - Validated commands described by per-verb descriptors
//! - Two interchangeable transports (buffered stream, framed chunks)
//! - Bounded write retries and one reconnect-and-resend per failed write
//! - Explicit reconnect reporting, so callers can spot possible duplicates
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Client                              │
//! │        (one call per verb, one request in flight)            │
//! └──────────────┬──────────────────────────────┬───────────────┘
//!                │ build / parse                │ write / read
//!                ▼                              ▼
//!   ┌────────────────────────┐     ┌────────────────────────────┐
//!   │        Command         │     │         Transport          │
//!   │ (verb descriptor, args)│     │   Stream  │   Framed       │
//!   └───────────┬────────────┘     └─────────────┬──────────────┘
//!               │                                │
//!               ▼                                ▼
//!   ┌────────────────────────┐     ┌────────────────────────────┐
//!   │  Status vocabulary     │     │  Link (liveness, retries,  │
//!   │  + YAML reader         │     │   reconnect, events)       │
//!   └────────────────────────┘     └────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use beanline::{Client, Config};
//!
//! # fn main() -> beanline::Result<()> {
//! let mut client = Client::connect(&Config::default())?;
//! client.use_tube("emails")?;
//! let put = client.put("hello")?;
//! if client.is_reconnected() {
//!     // the put may have reached the server twice
//! }
//! println!("job {} {}", put.id, put.status);
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod payload;
pub mod transport;
pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Error, ErrorKind, Result};
pub use config::{Config, TransportMode};
pub use client::{Client, SharedClient};
pub use payload::PayloadCodec;
pub use protocol::{Command, Job, PutResult, Reply, Status, YamlValue};
pub use transport::{Transport, TransportEvent, WriteOutcome};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of beanline
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
