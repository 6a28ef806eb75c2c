//! TCP dialer

use std::io;
use std::net::{TcpStream, ToSocketAddrs};

use super::{Dialer, Endpoint};

/// Dials plain TCP connections
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpDialer;

impl Dialer for TcpDialer {
    type Stream = TcpStream;

    /// Tries each resolved address in turn within the connect timeout
    fn dial(&self, endpoint: &Endpoint) -> io::Result<TcpStream> {
        let addrs = (endpoint.host.as_str(), endpoint.port).to_socket_addrs()?;

        let mut last_err = None;
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, endpoint.connect_timeout) {
                Ok(stream) => {
                    // Disable Nagle's algorithm; requests are small and latency-bound
                    stream.set_nodelay(true)?;
                    stream.set_read_timeout(endpoint.read_timeout.filter(|t| !t.is_zero()))?;
                    return Ok(stream);
                }
                Err(e) => {
                    tracing::debug!("Connect to {} failed: {}", addr, e);
                    last_err = Some(e);
                }
            }
        }

        Err(last_err.unwrap_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no addresses resolved for {}", endpoint.target()),
            )
        }))
    }
}
