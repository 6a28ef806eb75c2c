//! Configuration for beanline
//!
//! Centralized configuration with sensible defaults.

use std::time::Duration;

/// Which transport implementation carries the connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportMode {
    /// Buffered blocking stream, reads one line at a time
    #[default]
    Stream,

    /// Chunked reads into a frame buffer split on the line delimiter
    Framed,
}

/// Main configuration for a client connection
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// Server host name or address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Connect timeout
    pub connect_timeout: Duration,

    /// Read timeout; `None` blocks until the server answers, which `reserve`
    /// relies on
    pub read_timeout: Option<Duration>,

    /// Whether the connection is meant to be reused across logical calls
    pub persistent: bool,

    /// Transport implementation
    pub mode: TransportMode,

    // -------------------------------------------------------------------------
    // Job Defaults
    // -------------------------------------------------------------------------
    /// Priority used by `put` when the caller does not pick one
    pub default_priority: u32,

    /// Delay (seconds) used by `put` when the caller does not pick one
    pub default_delay: u32,

    /// Time-to-run (seconds) used by `put` when the caller does not pick one
    pub default_ttr: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 11300,
            connect_timeout: Duration::from_secs(60),
            read_timeout: None,
            persistent: true,
            mode: TransportMode::Stream,
            default_priority: 1024,
            default_delay: 0,
            default_ttr: 60,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// `host:port` string used in logs and error messages
    pub fn target(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the server host
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the server port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the connect timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set the read timeout
    pub fn read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.read_timeout = timeout;
        self
    }

    /// Mark the connection as persistent
    pub fn persistent(mut self, persistent: bool) -> Self {
        self.config.persistent = persistent;
        self
    }

    /// Select the transport implementation
    pub fn mode(mut self, mode: TransportMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Set the default job priority
    pub fn default_priority(mut self, priority: u32) -> Self {
        self.config.default_priority = priority;
        self
    }

    /// Set the default job delay (seconds)
    pub fn default_delay(mut self, delay: u32) -> Self {
        self.config.default_delay = delay;
        self
    }

    /// Set the default job time-to-run (seconds)
    pub fn default_ttr(mut self, ttr: u32) -> Self {
        self.config.default_ttr = ttr;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
